// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sw_core::{PaletteId, RecordKey};

fn delete(id: &str) -> WalChange {
    WalChange::Delete {
        key: RecordKey::palette(&PaletteId::from(id)),
    }
}

#[test]
fn fresh_entry_verifies() {
    let entry = WalEntry::new(1, delete("p-1"));
    assert!(entry.verify());
}

#[test]
fn tampered_entry_fails_verification() {
    let mut entry = WalEntry::new_with_timestamp(1, 0, delete("p-1"));
    entry.change = delete("p-2");
    assert!(!entry.verify());
}

#[test]
fn line_round_trip_keeps_checksum() {
    let entry = WalEntry::new_with_timestamp(4, 1_000, delete("p-1"));
    let line = entry.to_line().unwrap();
    assert!(!line.contains('\n'));
    let parsed = WalEntry::from_line(&line).unwrap();
    assert_eq!(parsed, entry);
    assert!(parsed.verify());
}

#[test]
fn truncated_line_does_not_parse() {
    let line = WalEntry::new(1, delete("p-1")).to_line().unwrap();
    assert!(WalEntry::from_line(&line[..line.len() / 2]).is_err());
}
