//! Color mode resolution: flags, config file and environment.

use predicates::prelude::*;

use crate::hilite;

const JSON: &str = r#"{"a":1}"#;

#[test]
fn color_always_emits_ansi() {
    hilite()
        .args(["--color=always", "--lexer", "json"])
        .write_stdin(JSON)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn color_never_has_no_ansi() {
    hilite()
        .args(["--color=never", "--lexer", "json"])
        .write_stdin(JSON)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn auto_without_tty_has_no_ansi() {
    // stdout is a pipe under assert_cmd.
    hilite()
        .args(["--lexer", "json"])
        .write_stdin(JSON)
        .assert()
        .success()
        .stdout("{\n  \"a\": 1\n}\n");
}

#[test]
fn short_flag_works() {
    hilite()
        .args(["-c", "always", "-l", "json"])
        .write_stdin(JSON)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn always_ignores_no_color() {
    hilite()
        .args(["--color=always", "--lexer", "json"])
        .env("NO_COLOR", "1")
        .write_stdin(JSON)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn colored_output_keeps_the_text() {
    let output = hilite()
        .args(["--color=always", "--lexer", "json"])
        .write_stdin(JSON)
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stripped = strip_ansi(&stdout);
    assert_eq!(stripped, "{\n  \"a\": 1\n}\n");
}

#[test]
fn invalid_color_value_is_rejected() {
    hilite()
        .arg("--color=sometimes")
        .write_stdin(JSON)
        .assert()
        .failure()
        .stderr(predicate::str::contains("sometimes"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
