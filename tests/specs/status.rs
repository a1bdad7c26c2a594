//! Status specs

use crate::prelude::*;

#[test]
fn status_reports_counts_and_health() {
    let ws = Workspace::new();
    ws.create_palette("One");
    ws.run(&["color", "add", "#000000"]);

    ws.sw()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("palettes:    1"))
        .stdout(predicate::str::contains("colors:      1"))
        .stdout(predicate::str::contains("persistence: healthy"))
        .stdout(predicate::str::contains("remote:      inactive"));
}
