// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by the engine integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use std::time::Duration;
use sw_core::{Color, ColorId, FakeClock, Palette, PaletteId, Record, Rgba};
use sw_engine::{EngineConfig, RetryPolicy};

pub fn clock() -> FakeClock {
    FakeClock::at(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
}

pub fn config() -> EngineConfig {
    let persist = RetryPolicy {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
        degrade_after: 3,
        max_attempts: None,
    };
    EngineConfig {
        undo_depth: 20,
        remote_retry: RetryPolicy {
            max_attempts: Some(5),
            ..persist.clone()
        },
        persist_retry: persist,
        pull_on_query: false,
    }
}

/// Palette `p` holding a, b, c, plus a color history with the same colors
pub fn palette_p() -> Vec<Record> {
    let at = clock();
    let color = |id: &str, n: u8| -> Record {
        Color::new(id, id, Rgba::opaque(n, n, n), sw_core::Clock::now(&at))
            .unwrap()
            .into()
    };
    vec![
        color("a", 10),
        color("b", 20),
        color("c", 30),
        Palette::color_history("history", sw_core::Clock::now(&at))
            .with_colors(["a", "b", "c"])
            .into(),
        Palette::new("p", "P", sw_core::Clock::now(&at))
            .with_colors(["a", "b", "c"])
            .into(),
    ]
}

pub fn pid(id: &str) -> PaletteId {
    PaletteId::from(id)
}

pub fn ids(ids: &[&str]) -> Vec<ColorId> {
    ids.iter().map(|s| ColorId::from(*s)).collect()
}

/// Poll until `check` holds, failing after two seconds
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..400 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}
