// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use sw_core::{Color, ColorId, FakeClock, MaterializedState, Palette, PaletteId, Record, Rgba};

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub fn clock() -> FakeClock {
    FakeClock::at(epoch())
}

/// Color created `minutes` after the epoch
pub fn color(id: &str, minutes: i64) -> Color {
    Color::new(
        id,
        id.to_uppercase(),
        Rgba::opaque(minutes as u8, 20, 30),
        epoch() + Duration::minutes(minutes),
    )
    .unwrap()
}

pub fn palette(id: &str, colors: &[&str]) -> Palette {
    Palette::new(id, id.to_uppercase(), epoch()).with_colors(colors.iter().copied())
}

pub fn cid(id: &str) -> ColorId {
    ColorId::from(id)
}

pub fn pid(id: &str) -> PaletteId {
    PaletteId::from(id)
}

pub fn ids(ids: &[&str]) -> Vec<ColorId> {
    ids.iter().map(|s| ColorId::from(*s)).collect()
}

/// Colors a, b, c in palette `p`, plus a color history holding all three
pub fn warm_records() -> Vec<Record> {
    let mut history = Palette::color_history("history", epoch());
    history = history.with_colors(["c", "b", "a"]);
    vec![
        color("a", 0).into(),
        color("b", 1).into(),
        color("c", 2).into(),
        history.into(),
        palette("p", &["a", "b", "c"]).into(),
    ]
}

pub fn warm_state() -> MaterializedState {
    MaterializedState::from_records(warm_records())
}

/// Engine config with millisecond backoff
pub fn fast_config() -> crate::EngineConfig {
    let policy = crate::RetryPolicy {
        initial_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(5),
        multiplier: 2.0,
        degrade_after: 3,
        max_attempts: None,
    };
    crate::EngineConfig {
        undo_depth: 10,
        persist_retry: policy.clone(),
        remote_retry: crate::RetryPolicy {
            max_attempts: Some(5),
            ..policy
        },
        pull_on_query: false,
    }
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..400 {
        if check() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}
