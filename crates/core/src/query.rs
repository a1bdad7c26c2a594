// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query expressions over materialized state

use crate::color::Color;
use crate::id::{ColorId, PaletteId};
use crate::palette::Palette;
use crate::record::{RecordKey, RecordKind};
use crate::state::MaterializedState;
use serde::{Deserialize, Serialize};

/// Number of colors shown in the recent-colors strip
pub const RECENT_COLORS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    /// Every palette, color history included
    AllPalettes,
    /// User palettes (color history excluded), optionally only favorites
    Palettes { favorites_only: bool },
    Palette { id: PaletteId },
    /// Colors of the color-history palette, newest first
    ColorHistory,
    PaletteColors { id: PaletteId },
    AllColors,
    Color { id: ColorId },
    /// Newest `n` colors of the color history
    LastColors { n: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Palettes(Vec<Palette>),
    Palette(Option<Palette>),
    Colors(Vec<Color>),
    Color(Option<Color>),
}

impl QueryResult {
    /// Compare by value rather than identity
    pub fn same_values(&self, other: &QueryResult) -> bool {
        match (self, other) {
            (QueryResult::Palettes(a), QueryResult::Palettes(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y && x.same_values(y))
            }
            (QueryResult::Palette(a), QueryResult::Palette(b)) => match (a, b) {
                (Some(x), Some(y)) => x == y && x.same_values(y),
                (None, None) => true,
                _ => false,
            },
            (QueryResult::Colors(a), QueryResult::Colors(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y && x.same_values(y))
            }
            (QueryResult::Color(a), QueryResult::Color(b)) => match (a, b) {
                (Some(x), Some(y)) => x == y && x.same_values(y),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }

    pub fn palettes(&self) -> &[Palette] {
        match self {
            QueryResult::Palettes(p) => p,
            _ => &[],
        }
    }

    pub fn colors(&self) -> &[Color] {
        match self {
            QueryResult::Colors(c) => c,
            _ => &[],
        }
    }
}

impl Query {
    pub fn evaluate(&self, state: &MaterializedState) -> QueryResult {
        match self {
            Query::AllPalettes => {
                QueryResult::Palettes(state.ordered_palettes().into_iter().cloned().collect())
            }
            Query::Palettes { favorites_only } => QueryResult::Palettes(
                state
                    .ordered_palettes()
                    .into_iter()
                    .filter(|p| !p.is_color_history)
                    .filter(|p| !favorites_only || p.is_favorite)
                    .cloned()
                    .collect(),
            ),
            Query::Palette { id } => QueryResult::Palette(state.palette(id).cloned()),
            Query::ColorHistory => QueryResult::Colors(history_colors(state)),
            Query::PaletteColors { id } => QueryResult::Colors(state.palette_colors(id)),
            Query::AllColors => QueryResult::Colors(state.colors.values().cloned().collect()),
            Query::Color { id } => QueryResult::Color(state.color(id).cloned()),
            Query::LastColors { n } => {
                let mut colors = history_colors(state);
                colors.truncate(*n);
                QueryResult::Colors(colors)
            }
        }
    }

    /// Whether a change to `keys` can alter this query's result
    ///
    /// Conservative: may report true for changes that leave the result equal.
    pub fn is_affected_by(&self, keys: &[RecordKey], state: &MaterializedState) -> bool {
        match self {
            Query::AllPalettes | Query::Palettes { .. } => {
                keys.iter().any(|k| k.kind == RecordKind::Palette)
            }
            Query::AllColors => keys.iter().any(|k| k.kind == RecordKind::Color),
            Query::Palette { id } => keys.contains(&RecordKey::palette(id)),
            Query::Color { id } => keys.contains(&RecordKey::color(id)),
            Query::PaletteColors { id } => touches_palette(keys, state, id),
            Query::ColorHistory | Query::LastColors { .. } => {
                let history = state.color_history().map(|p| p.id.clone());
                match history {
                    Some(id) => touches_palette(keys, state, &id),
                    None => keys.iter().any(|k| k.kind == RecordKind::Palette),
                }
            }
        }
    }
}

fn history_colors(state: &MaterializedState) -> Vec<Color> {
    state
        .color_history()
        .map(|p| state.palette_colors(&p.id))
        .unwrap_or_default()
}

fn touches_palette(keys: &[RecordKey], state: &MaterializedState, id: &PaletteId) -> bool {
    keys.iter().any(|k| match k.kind {
        RecordKind::Palette => k.id == id.as_str(),
        RecordKind::Color => state
            .palette(id)
            .is_some_and(|p| p.colors.contains(k.id.as_str())),
    })
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
