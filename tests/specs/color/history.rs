//! Color history specs

use crate::prelude::*;

#[test]
fn picked_colors_land_in_history() {
    let ws = Workspace::new();
    ws.run(&["color", "add", "#112233"]);
    ws.run(&["color", "add", "#445566"]);

    let out = ws.run(&["color", "list"]);
    assert!(out.contains("#112233"));
    assert!(out.contains("#445566"));
}

#[test]
fn copy_into_palette_keeps_history_entry() {
    let ws = Workspace::new();
    ws.create_palette("Target");
    ws.run(&["color", "add", "#abcdef", "--palette", "Target"]);

    let history = ws.run(&["color", "list"]);
    let palette = ws.run(&["color", "list", "--palette", "Target"]);
    assert!(history.contains("#abcdef"));
    assert!(palette.contains("#abcdef"));

    ws.run(&["color", "remove", "Target", "#abcdef"]);
    assert!(ws.run(&["color", "list"]).contains("#abcdef"));
}
