//! Config file handling and user-defined lexers.

use std::fs;
use std::path::Path;

use predicates::prelude::*;

use crate::hilite;

const WORDS_LEXER: &str = r#"
name = "words"
filenames = ["*.words"]
media_types = ["text/x-words"]
filters = [{ name = "merge-adjacent" }]

[states]
root = [
    { pattern = '[0-9]+', type = "number" },
    { pattern = '[A-Za-z]+', type = "entity" },
    { pattern = '\s+', type = "whitespace" },
]
"#;

/// Write `config.toml` under `<dir>/hilite/` and return that directory.
fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let config_dir = dir.join("hilite");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), content).unwrap();
    config_dir
}

#[test]
fn config_color_always_applies() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "color = \"always\"\n");

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["--lexer", "json"])
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn cli_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "color = \"always\"\n");

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["--color=never", "--lexer", "json"])
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[\n  1\n]\n");
}

#[test]
fn config_indent_is_used_by_json() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "indent = \"\\t\"\n");

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["--color=never", "--lexer", "json"])
        .write_stdin("{\"a\":[1]}")
        .assert()
        .success()
        .stdout("{\n\t\"a\": [\n\t\t1\n\t]\n}\n");
}

#[test]
fn explicit_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "indent = \"    \"\n").unwrap();

    hilite()
        .arg("--config")
        .arg(&path)
        .args(["--color=never", "--lexer", "json"])
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[\n    1\n]\n");
}

#[test]
fn missing_explicit_config_exits_one() {
    hilite()
        .args(["--config", "/nonexistent/hilite.toml"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn unknown_config_key_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "colour = \"always\"\n");

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn custom_lexer_selected_by_filename() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = write_config(dir.path(), "lexers = [\"words.toml\"]\n");
    fs::write(config_dir.join("words.toml"), WORDS_LEXER).unwrap();
    let input = dir.path().join("list.words");
    fs::write(&input, "abc 123\n").unwrap();

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("--debug")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("entity\t\"abc\""))
        .stdout(predicate::str::contains("number\t\"123\""));
}

#[test]
fn custom_lexer_by_media_type_and_in_list() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = write_config(dir.path(), "lexers = [\"words.toml\"]\n");
    fs::write(config_dir.join("words.toml"), WORDS_LEXER).unwrap();

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["--debug", "-t", "TEXT/X-WORDS"])
        .write_stdin("one two")
        .assert()
        .success()
        .stdout(predicate::str::contains("entity\t\"one\""));

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("words"))
        .stdout(predicate::str::contains("*.words"));
}

#[test]
fn duplicate_lexer_name_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = write_config(dir.path(), "lexers = [\"json.toml\"]\n");
    fs::write(
        config_dir.join("json.toml"),
        "name = \"json\"\n[states]\nroot = [{ pattern = '.+' }]\n",
    )
    .unwrap();

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn malformed_glob_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = write_config(dir.path(), "lexers = [\"bad.toml\"]\n");
    fs::write(
        config_dir.join("bad.toml"),
        "name = \"bad\"\nfilenames = [\"*.[ch\"]\n[states]\nroot = [{ pattern = '.+' }]\n",
    )
    .unwrap();

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed filename pattern"));
}

#[test]
fn lexer_without_root_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = write_config(dir.path(), "lexers = [\"noroot.json\"]\n");
    fs::write(
        config_dir.join("noroot.json"),
        r#"{"name": "noroot", "states": {"main": [{"pattern": "x"}]}}"#,
    )
    .unwrap();

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no 'root' state"));
}

#[test]
fn unknown_color_override_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "[colors]\nkeyword = \"red\"\nnumber = \"cyan\"\n");

    hilite()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["--color=never", "--lexer", "json"])
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[\n  1\n]\n")
        .stderr(predicate::str::contains("keyword"));
}
