//! Integration tests for the `hilite` binary and library.

mod color_control;
mod config_custom;
mod engine;
mod http_message;

use assert_cmd::Command;

/// The binary, isolated from any config file on the host.
#[allow(deprecated)]
pub fn hilite() -> Command {
    let mut cmd = Command::cargo_bin("hilite").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/tmp/hilite-test-no-config");
    cmd.env_remove("RUST_LOG");
    cmd
}
