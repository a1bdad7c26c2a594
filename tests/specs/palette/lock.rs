//! Locked palette specs

use crate::prelude::*;

#[test]
fn locked_palette_rejects_color_removal() {
    let ws = Workspace::new();
    ws.create_palette("Fixed");
    ws.run(&["color", "add", "#ff0000", "--name", "Red", "--palette", "Fixed"]);
    ws.run(&["palette", "lock", "Fixed"]);

    ws.sw()
        .args(["color", "remove", "Fixed", "Red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked palette mutation"))
        .stderr(predicate::str::contains("sw palette unlock"));

    ws.sw()
        .args(["color", "list", "--palette", "Fixed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#ff0000"));
}

#[test]
fn unlocked_palette_allows_removal() {
    let ws = Workspace::new();
    ws.create_palette("Loose");
    ws.run(&["color", "add", "00ff00", "--name", "Green", "--palette", "Loose"]);
    ws.run(&["palette", "lock", "Loose"]);
    ws.run(&["palette", "unlock", "Loose"]);

    ws.run(&["color", "remove", "Loose", "Green"]);
    ws.sw()
        .args(["color", "list", "--palette", "Loose"])
        .assert()
        .success()
        .stdout("No colors\n");
}
