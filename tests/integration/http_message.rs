//! HTTP messages: head tokenized, body dispatched on `Content-Type`.

use predicates::prelude::*;

use crate::hilite;

const JSON_RESPONSE: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 7\r\n\r\n{\"a\":1}";

#[test]
fn http_flag_formats_json_body() {
    hilite()
        .args(["--color=never", "--http"])
        .write_stdin(JSON_RESPONSE)
        .assert()
        .success()
        .stdout(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 7\r\n\r\n{\n  \"a\": 1\n}\n",
        );
}

#[test]
fn http_file_extension_selects_message_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("response.http");
    std::fs::write(&path, JSON_RESPONSE).unwrap();

    hilite()
        .arg("--color=never")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::ends_with("{\n  \"a\": 1\n}\n"));
}

#[test]
fn request_with_html_body() {
    let input = "POST /submit HTTP/1.1\r\nHost: example.com\r\nContent-Type: text/html; charset=utf-8\r\n\r\n<b>hi</b>\n";
    hilite()
        .args(["--debug", "--http"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("constant\t\"POST\""))
        .stdout(predicate::str::contains("attribute\t\"Host\""))
        .stdout(predicate::str::contains("entity\t\"b\""));
}

#[test]
fn unknown_body_type_passes_through() {
    let input = "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\r\n{\"a\":1}";
    hilite()
        .args(["--color=never", "--http"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(input);
}

#[test]
fn head_only_message() {
    let input = "HTTP/1.1 304 Not Modified\r\nETag: \"x\"\r\n";
    hilite()
        .args(["--color=never", "--http"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(input);
}

#[test]
fn content_type_flag_selects_tokenizer() {
    hilite()
        .args(["--color=never", "--content-type", "application/json; charset=utf-8"])
        .write_stdin("[true]")
        .assert()
        .success()
        .stdout("[\n  true\n]\n");
}

#[test]
fn content_type_without_tokenizer_passes_through() {
    hilite()
        .args(["--color=always", "-t", "image/png"])
        .write_stdin("[true]")
        .assert()
        .success()
        .stdout("[true]");
}

#[test]
fn malformed_content_type_flag_is_a_usage_error() {
    hilite()
        .args(["--content-type", "json"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid media type"));
}

#[test]
fn message_http_media_type_selects_message_mode() {
    hilite()
        .args(["--color=never", "-t", "message/http"])
        .write_stdin(JSON_RESPONSE)
        .assert()
        .success()
        .stdout(predicate::str::ends_with("{\n  \"a\": 1\n}\n"));
}

#[test]
fn colored_head_and_body() {
    let output = hilite()
        .args(["--color=always", "--http"])
        .write_stdin(JSON_RESPONSE)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\x1b["));
    assert!(stdout.contains("200"));
    assert!(stdout.contains("application/json"));
}
