//! Error reporting specs

use crate::prelude::*;

#[test]
fn unknown_palette_fails_with_suggestion() {
    let ws = Workspace::new();
    ws.sw()
        .args(["palette", "delete", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no palette matches 'missing'"))
        .stderr(predicate::str::contains("sw palette list"));
}

#[test]
fn invalid_hex_is_rejected() {
    let ws = Workspace::new();
    ws.sw()
        .args(["color", "add", "not-a-color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn broken_config_is_reported() {
    let ws = Workspace::new();
    std::fs::write(ws.config_path(), "backend = \"sqlite\"\n").unwrap();
    ws.sw()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}
