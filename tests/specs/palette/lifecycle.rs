//! Palette lifecycle specs

use crate::prelude::*;

#[test]
fn empty_store_lists_no_palettes() {
    let ws = Workspace::new();
    ws.sw()
        .args(["palette", "list"])
        .assert()
        .success()
        .stdout("No palettes\n");
}

#[test]
fn created_palette_persists_across_invocations() {
    let ws = Workspace::new();
    let id = ws.create_palette("Sunset");

    ws.sw()
        .args(["palette", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id))
        .stdout(predicate::str::contains("Sunset"));
}

#[test]
fn rename_then_delete_by_name() {
    let ws = Workspace::new();
    ws.create_palette("Draft");
    ws.run(&["palette", "rename", "Draft", "Final"]);

    ws.sw()
        .args(["palette", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Final"))
        .stdout(predicate::str::contains("Draft").not());

    ws.run(&["palette", "delete", "Final"]);
    ws.sw()
        .args(["palette", "list"])
        .assert()
        .success()
        .stdout("No palettes\n");
}

#[test]
fn favorites_filter() {
    let ws = Workspace::new();
    ws.create_palette("Liked");
    ws.create_palette("Other");
    ws.run(&["palette", "favorite", "Liked"]);

    ws.sw()
        .args(["palette", "list", "--favorites"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Liked"))
        .stdout(predicate::str::contains("Other").not());
}

#[test]
fn json_backend_round_trips() {
    let ws = Workspace::with_backend("json");
    ws.create_palette("Stored");
    assert!(ws.path().join("data/records").is_dir());

    ws.sw()
        .args(["palette", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Stored\""));
}
