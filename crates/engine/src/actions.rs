// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Palette actions
//!
//! Each action reads the current state and plans the operation batch that
//! carries out one user request. Planning is pure: the runtime commits the
//! batch through the cache under the entity locks the action names.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use sw_core::{
    Attribute, Color, ColorId, InvariantViolation, MaterializedState, Operation, Palette,
    PaletteId, RecordKey, Rgba, SchemaViolation, UpdateError,
};

/// Default name for new palettes
pub const NEW_PALETTE_NAME: &str = "Palette";

/// Placeholder id reported when no color history exists
const COLOR_HISTORY: &str = "color-history";

/// A drag of one color between two lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub source: PaletteId,
    pub source_index: usize,
    pub target: PaletteId,
    pub target_index: usize,
}

impl MoveRequest {
    pub fn is_noop(&self) -> bool {
        self.source == self.target && self.source_index == self.target_index
    }
}

fn palette<'a>(state: &'a MaterializedState, id: &PaletteId) -> Result<&'a Palette, UpdateError> {
    state.palette(id).ok_or_else(|| {
        InvariantViolation::MissingRecord {
            key: RecordKey::palette(id),
        }
        .into()
    })
}

fn color<'a>(state: &'a MaterializedState, id: &ColorId) -> Result<&'a Color, UpdateError> {
    state.color(id).ok_or_else(|| {
        InvariantViolation::MissingRecord {
            key: RecordKey::color(id),
        }
        .into()
    })
}

fn history(state: &MaterializedState) -> Result<&Palette, UpdateError> {
    state.color_history().ok_or_else(|| {
        InvariantViolation::MissingRecord {
            key: RecordKey::palette(&PaletteId::from(COLOR_HISTORY)),
        }
        .into()
    })
}

fn out_of_range(attribute: &'static str, index: usize, len: usize) -> UpdateError {
    SchemaViolation::InvalidAttribute {
        attribute,
        reason: format!("index {} out of range for {} items", index, len),
    }
    .into()
}

/// True when no palette other than `except` references the color
fn orphaned_without(state: &MaterializedState, color: &ColorId, except: &PaletteId) -> bool {
    state
        .palettes_containing(color)
        .iter()
        .all(|p| p == except)
}

pub fn create_palette(
    id: PaletteId,
    name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<Operation>, UpdateError> {
    let palette = Palette::new(id, name.unwrap_or(NEW_PALETTE_NAME), now);
    palette.validate()?;
    Ok(vec![Operation::add_record(palette)])
}

/// Copy every attribute and color of `source` under `id`
///
/// The copy is never the color history.
pub fn duplicate_palette(
    state: &MaterializedState,
    source: &PaletteId,
    id: PaletteId,
) -> Result<Vec<Operation>, UpdateError> {
    let mut copy = palette(state, source)?.clone();
    copy.id = id;
    copy.is_color_history = false;
    Ok(vec![Operation::add_record(copy)])
}

pub fn delete_palette(
    state: &MaterializedState,
    id: &PaletteId,
) -> Result<Vec<Operation>, UpdateError> {
    let target = palette(state, id)?;
    if target.is_color_history {
        return Err(InvariantViolation::ColorHistoryRemoval {
            palette: target.id.clone(),
        }
        .into());
    }
    Ok(vec![Operation::remove_record(target.key())])
}

pub fn rename_palette(
    state: &MaterializedState,
    id: &PaletteId,
    name: &str,
) -> Result<Vec<Operation>, UpdateError> {
    let target = palette(state, id)?;
    Ok(vec![Operation::update_attribute(
        target.key(),
        Attribute::Name(name.to_string()),
    )])
}

pub fn toggle_favorite(
    state: &MaterializedState,
    id: &PaletteId,
) -> Result<Vec<Operation>, UpdateError> {
    let target = palette(state, id)?;
    Ok(vec![Operation::update_attribute(
        target.key(),
        Attribute::IsFavorite(!target.is_favorite),
    )])
}

pub fn set_locked(
    state: &MaterializedState,
    id: &PaletteId,
    locked: bool,
) -> Result<Vec<Operation>, UpdateError> {
    let target = palette(state, id)?;
    Ok(vec![Operation::update_attribute(
        target.key(),
        Attribute::IsLocked(locked),
    )])
}

pub fn toggle_lock(
    state: &MaterializedState,
    id: &PaletteId,
) -> Result<Vec<Operation>, UpdateError> {
    let locked = palette(state, id)?.is_locked;
    set_locked(state, id, !locked)
}

pub fn set_selected_color_index(
    state: &MaterializedState,
    id: &PaletteId,
    index: u32,
) -> Result<Vec<Operation>, UpdateError> {
    let target = palette(state, id)?;
    Ok(vec![Operation::update_attribute(
        target.key(),
        Attribute::SelectedColorIndex(index),
    )])
}

/// A freshly picked color, before it is recorded
#[derive(Debug, Clone)]
pub struct NewColor {
    pub id: ColorId,
    pub name: String,
    pub rgba: Rgba,
    pub created_at: DateTime<Utc>,
}

/// Record a picked color in the history, optionally appending a copy to `palette`
pub fn add_color(
    state: &MaterializedState,
    new: NewColor,
    palette_copy: Option<(PaletteId, ColorId)>,
) -> Result<Vec<Operation>, UpdateError> {
    let history = history(state)?;
    let color = Color::new(new.id, new.name, new.rgba, new.created_at)?;

    let mut history_order = vec![color.id.clone()];
    history_order.extend(history.color_order.iter().cloned());
    let mut ops = vec![
        Operation::add_record(color.clone()),
        Operation::add_to_relationship(&history.id, &color.id),
        Operation::set_color_order(&history.id, history_order),
    ];

    if let Some((target_id, copy_id)) = palette_copy {
        let target = palette(state, &target_id)?;
        if !target.is_color_history {
            let mut copy = color;
            copy.id = copy_id;
            let mut order = target.color_order.clone();
            order.push(copy.id.clone());
            ops.push(Operation::add_to_relationship(&target.id, &copy.id));
            ops.push(Operation::set_color_order(&target.id, order));
            ops.insert(0, Operation::add_record(copy));
        }
    }
    Ok(ops)
}

/// Unlink a color from a palette, deleting it once nothing references it
pub fn delete_color(
    state: &MaterializedState,
    palette_id: &PaletteId,
    color_id: &ColorId,
) -> Result<Vec<Operation>, UpdateError> {
    let target = palette(state, palette_id)?;
    if !target.contains(color_id) {
        return Err(InvariantViolation::MissingRecord {
            key: RecordKey::color(color_id),
        }
        .into());
    }
    let order: Vec<ColorId> = target
        .color_order
        .iter()
        .filter(|c| *c != color_id)
        .cloned()
        .collect();
    let mut ops = vec![
        Operation::remove_from_relationship(palette_id, color_id),
        Operation::set_color_order(palette_id, order),
    ];
    if orphaned_without(state, color_id, palette_id) {
        ops.push(Operation::remove_record(RecordKey::color(color_id)));
    }
    Ok(ops)
}

/// Swap a color for an edited copy at the same position
///
/// The copy keeps the original's creation time so history ordering holds.
pub fn replace_color(
    state: &MaterializedState,
    palette_id: &PaletteId,
    color_id: &ColorId,
    replacement_id: ColorId,
    rgba: Rgba,
    name: &str,
) -> Result<Vec<Operation>, UpdateError> {
    let target = palette(state, palette_id)?;
    let original = color(state, color_id)?;
    let position = target.position(color_id).ok_or_else(|| {
        UpdateError::from(InvariantViolation::MissingRecord {
            key: RecordKey::color(color_id),
        })
    })?;

    let mut replacement = Color::new(replacement_id, name, rgba, original.created_at)?;
    replacement.index = original.index;

    let mut order = target.color_order.clone();
    order[position] = replacement.id.clone();

    let mut ops = vec![
        Operation::add_record(replacement.clone()),
        Operation::remove_from_relationship(palette_id, color_id),
        Operation::add_to_relationship(palette_id, &replacement.id),
        Operation::set_color_order(palette_id, order),
    ];
    if orphaned_without(state, color_id, palette_id) {
        ops.push(Operation::remove_record(RecordKey::color(color_id)));
    }
    Ok(ops)
}

/// Plan a drag between (or within) color lists
///
/// `copy_id` and `now` are used only when the source is the color history,
/// which hands out copies instead of moving its own colors.
pub fn move_color(
    state: &MaterializedState,
    request: &MoveRequest,
    copy_id: ColorId,
    now: DateTime<Utc>,
) -> Result<Vec<Operation>, UpdateError> {
    if request.is_noop() {
        return Ok(Vec::new());
    }
    let source = palette(state, &request.source)?;
    let target = palette(state, &request.target)?;
    for p in [source, target] {
        if p.is_locked {
            return Err(InvariantViolation::LockedPalette {
                palette: p.id.clone(),
            }
            .into());
        }
    }

    let source_list = state.palette_colors(&source.id);
    let item = source_list
        .get(request.source_index)
        .cloned()
        .ok_or_else(|| out_of_range("source_index", request.source_index, source_list.len()))?;

    if source.is_color_history {
        if target.is_color_history {
            return Err(InvariantViolation::ColorHistoryReorder {
                palette: source.id.clone(),
            }
            .into());
        }
        return Ok(copy_from_history(state, target, &item, request.target_index, copy_id, now));
    }

    let mut ops = Vec::new();
    let source_order: Vec<ColorId> = source
        .color_order
        .iter()
        .filter(|c| **c != item.id)
        .cloned()
        .collect();

    if target.is_color_history {
        ops.push(Operation::remove_from_relationship(&source.id, &item.id));
        ops.push(Operation::set_color_order(&source.id, source_order));
        if orphaned_without(state, &item.id, &source.id) {
            ops.push(Operation::remove_record(RecordKey::color(&item.id)));
        }
        return Ok(ops);
    }

    if source.id == target.id {
        let mut order = source_order;
        let index = request.target_index.min(order.len());
        order.insert(index, item.id.clone());
        ops.push(Operation::set_color_order(&source.id, order));
        return Ok(ops);
    }

    ops.push(Operation::remove_from_relationship(&source.id, &item.id));
    ops.push(Operation::set_color_order(&source.id, source_order));

    let mut insert_at = request.target_index;
    let mut order = target.color_order.clone();
    if let Some(existing) = state
        .palette_colors(&target.id)
        .into_iter()
        .find(|c| c.hex() == item.hex())
    {
        if let Some(position) = order.iter().position(|c| *c == existing.id) {
            if position < insert_at {
                insert_at -= 1;
            }
            order.remove(position);
        }
        if existing.id != item.id {
            order.retain(|c| *c != item.id);
            ops.push(Operation::remove_from_relationship(&target.id, &existing.id));
            if orphaned_without(state, &existing.id, &target.id) {
                ops.push(Operation::remove_record(RecordKey::color(&existing.id)));
            }
        }
    }
    order.insert(insert_at.min(order.len()), item.id.clone());
    ops.push(Operation::add_to_relationship(&target.id, &item.id));
    ops.push(Operation::set_color_order(&target.id, order));
    Ok(ops)
}

fn copy_from_history(
    state: &MaterializedState,
    target: &Palette,
    item: &Color,
    target_index: usize,
    copy_id: ColorId,
    now: DateTime<Utc>,
) -> Vec<Operation> {
    let mut copy = item.clone();
    copy.id = copy_id;
    copy.created_at = now;

    let mut ops = vec![Operation::add_record(copy.clone())];
    let mut colors: BTreeSet<ColorId> = target.colors.clone();
    let mut order = target.color_order.clone();
    let mut removed = Vec::new();

    if let Some(existing) = state
        .palette_colors(&target.id)
        .into_iter()
        .find(|c| c.hex() == item.hex())
    {
        order.retain(|c| *c != existing.id);
        colors.remove(&existing.id);
        if orphaned_without(state, &existing.id, &target.id) {
            removed.push(existing.id);
        }
    }

    order.insert(target_index.min(order.len()), copy.id.clone());
    colors.insert(copy.id.clone());
    ops.push(Operation::replace_relationship(&target.id, colors));
    ops.push(Operation::set_color_order(&target.id, order));
    ops.extend(
        removed
            .iter()
            .map(|id| Operation::remove_record(RecordKey::color(id))),
    );
    ops
}

/// Move one user palette in the list and renumber every user palette
pub fn reorder_palettes(
    state: &MaterializedState,
    source_index: usize,
    target_index: usize,
) -> Result<Vec<Operation>, UpdateError> {
    if source_index == target_index {
        return Ok(Vec::new());
    }
    let mut palettes: Vec<&Palette> = state
        .ordered_palettes()
        .into_iter()
        .filter(|p| !p.is_color_history)
        .collect();
    if source_index >= palettes.len() {
        return Err(out_of_range("source_index", source_index, palettes.len()));
    }
    let moved = palettes.remove(source_index);
    palettes.insert(target_index.min(palettes.len()), moved);

    Ok(palettes
        .iter()
        .enumerate()
        .filter(|(i, p)| p.index != *i as i64)
        .map(|(i, p)| Operation::update_attribute(p.key(), Attribute::Index(i as i64)))
        .collect())
}

/// Make sure exactly one color-history palette exists
///
/// With several, `preferred` (or else the oldest) absorbs the others' colors
/// and the rest are removed.
pub fn ensure_color_history(
    state: &MaterializedState,
    preferred: Option<&PaletteId>,
    new_id: PaletteId,
    now: DateTime<Utc>,
) -> Vec<Operation> {
    let mut histories: Vec<&Palette> = state
        .palettes
        .values()
        .filter(|p| p.is_color_history)
        .collect();
    if histories.is_empty() {
        return vec![Operation::add_record(Palette::color_history(new_id, now))];
    }
    if histories.len() == 1 {
        return Vec::new();
    }

    histories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    let keeper = preferred
        .and_then(|id| histories.iter().find(|p| p.id == *id))
        .copied()
        .unwrap_or(histories[0]);

    let mut ops = Vec::new();
    if keeper.is_locked {
        ops.push(Operation::update_attribute(keeper.key(), Attribute::IsLocked(false)));
    }
    let mut order = keeper.color_order.clone();
    for other in histories.iter().filter(|p| p.id != keeper.id) {
        for color in &other.color_order {
            if !order.contains(color) {
                ops.push(Operation::add_to_relationship(&keeper.id, color));
                order.push(color.clone());
            }
        }
    }
    ops.push(Operation::set_color_order(&keeper.id, order));
    for other in histories.iter().filter(|p| p.id != keeper.id) {
        if other.is_locked {
            ops.push(Operation::update_attribute(other.key(), Attribute::IsLocked(false)));
        }
        ops.push(Operation::remove_record(other.key()));
    }
    if keeper.is_locked {
        ops.push(Operation::update_attribute(keeper.key(), Attribute::IsLocked(true)));
    }
    ops
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
