//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_command_groups() {
    Command::cargo_bin("sw")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("palette"))
        .stdout(predicate::str::contains("color"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn palette_help_lists_actions() {
    Command::cargo_bin("sw")
        .unwrap()
        .args(["palette", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("unlock"))
        .stdout(predicate::str::contains("favorite"));
}
