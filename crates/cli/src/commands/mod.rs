// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod color;
pub mod palette;
pub mod status;

use crate::error::SwError;
use sw_adapters::{NoOpRemoteAdapter, TracedRemoteAdapter};
use sw_core::{ColorId, MaterializedState, PaletteId, SystemClock, UuidIdGen};
use sw_engine::Runtime;
use sw_storage::TracedBackend;

/// Runtime as the binary builds it: offline, traced, wall-clock
pub type SwRuntime<B> =
    Runtime<TracedBackend<B>, TracedRemoteAdapter<NoOpRemoteAdapter>, SystemClock, UuidIdGen>;

/// Find a palette by exact id, or else by unique name
pub fn resolve_palette(state: &MaterializedState, query: &str) -> Result<PaletteId, SwError> {
    if let Some(p) = state.palette(&PaletteId::from(query)) {
        return Ok(p.id.clone());
    }
    let matches: Vec<_> = state
        .palettes
        .values()
        .filter(|p| !p.is_color_history && p.name == query)
        .collect();
    match matches.as_slice() {
        [] => Err(SwError::palette_not_found(query)),
        [p] => Ok(p.id.clone()),
        _ => Err(SwError::ambiguous_palette(query, matches.len())),
    }
}

/// Find a color of `palette` by id, hex or name
pub fn resolve_color(
    state: &MaterializedState,
    palette: &PaletteId,
    query: &str,
) -> Result<ColorId, SwError> {
    let colors = state.palette_colors(palette);
    let needle = query.to_ascii_lowercase();
    colors
        .iter()
        .find(|c| c.id.as_str() == query)
        .or_else(|| {
            colors.iter().find(|c| {
                c.rgba.hex() == needle || c.rgba.hex() == format!("#{}", needle) || c.name == query
            })
        })
        .map(|c| c.id.clone())
        .ok_or_else(|| {
            SwError::new(format!("no color '{}' in palette {}", query, palette))
                .with_suggestion(format!("List its colors: sw color list --palette {}", palette))
        })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
