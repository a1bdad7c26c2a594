// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use sw_core::{Color, Palette, Rgba};

fn state() -> MaterializedState {
    let now = Utc::now();
    let red = Color::new("red-id", "Red", Rgba::opaque(255, 0, 0), now).ok();
    let mut records: Vec<sw_core::Record> = red.into_iter().map(Into::into).collect();
    records.push(Palette::new("p1", "Warm", now).with_colors(["red-id"]).into());
    records.push(Palette::new("p2", "Cool", now).into());
    records.push(Palette::new("p3", "Cool", now).into());
    MaterializedState::from_records(records)
}

#[test]
fn palettes_resolve_by_id_then_name() {
    let state = state();
    assert_eq!(resolve_palette(&state, "p2").ok(), Some(PaletteId::from("p2")));
    assert_eq!(resolve_palette(&state, "Warm").ok(), Some(PaletteId::from("p1")));
}

#[test]
fn duplicate_names_are_ambiguous() {
    let err = resolve_palette(&state(), "Cool").err().map(|e| e.message);
    assert_eq!(err.as_deref(), Some("'Cool' matches 2 palettes"));
}

#[test]
fn unknown_palette_is_reported() {
    assert!(resolve_palette(&state(), "nope").is_err());
}

#[test]
fn colors_resolve_by_hex_or_name() {
    let state = state();
    let p1 = PaletteId::from("p1");
    let red = Some(ColorId::from("red-id"));
    assert_eq!(resolve_color(&state, &p1, "#ff0000").ok(), red);
    assert_eq!(resolve_color(&state, &p1, "FF0000").ok(), red);
    assert_eq!(resolve_color(&state, &p1, "Red").ok(), red);
    assert!(resolve_color(&state, &p1, "Blue").is_err());
}
