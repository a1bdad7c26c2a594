// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::{ColorId, PaletteId};
use crate::log::Origin;
use chrono::Utc;

#[test]
fn relationship_fields_name_the_color() {
    let op = Operation::add_to_relationship(&PaletteId::from("p"), &ColorId::from("c"));
    assert_eq!(op.name(), "add_to_relationship");
    assert_eq!(format_fields(&op.fields()), "key=palette:p color=c");
}

#[test]
fn log_entry_fields_lead_with_sequence() {
    let entry = LogEntry {
        seq: 7,
        transaction: 3,
        origin: Origin::Undo,
        timestamp: Utc::now(),
        operation: Operation::set_color_order(&PaletteId::from("p"), vec![]),
    };
    assert_eq!(entry.name(), "update_attribute");
    assert_eq!(
        format_fields(&entry.fields()),
        "seq=7 transaction=3 origin=undo key=palette:p attribute=color_order"
    );
}
