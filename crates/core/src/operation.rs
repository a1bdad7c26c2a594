// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations: the atomic unit of change
//!
//! Every mutation is expressed as a list of operations. Callers may leave the
//! `old` fields empty; the cache fills them in when it applies the operation,
//! so every logged operation carries what it needs to build its inverse.

use crate::id::{ColorId, PaletteId};
use crate::record::{Attribute, Record, RecordKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert a record that did not exist before
    AddRecord { record: Record },

    /// Overwrite one scalar attribute
    UpdateAttribute {
        key: RecordKey,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old: Option<Attribute>,
        new: Attribute,
    },

    /// Hard-delete a record
    RemoveRecord {
        key: RecordKey,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        record: Option<Record>,
    },

    /// Add a color to a palette's `colors` relationship
    AddToRelationship { palette: PaletteId, color: ColorId },

    /// Remove a color from a palette's `colors` relationship
    RemoveFromRelationship { palette: PaletteId, color: ColorId },

    /// Replace a palette's whole `colors` relationship
    ReplaceRelationship {
        palette: PaletteId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old: Option<BTreeSet<ColorId>>,
        new: BTreeSet<ColorId>,
    },
}

impl Operation {
    pub fn add_record(record: impl Into<Record>) -> Self {
        Operation::AddRecord {
            record: record.into(),
        }
    }

    pub fn update_attribute(key: RecordKey, new: Attribute) -> Self {
        Operation::UpdateAttribute {
            key,
            old: None,
            new,
        }
    }

    pub fn remove_record(key: RecordKey) -> Self {
        Operation::RemoveRecord { key, record: None }
    }

    pub fn add_to_relationship(palette: &PaletteId, color: &ColorId) -> Self {
        Operation::AddToRelationship {
            palette: palette.clone(),
            color: color.clone(),
        }
    }

    pub fn remove_from_relationship(palette: &PaletteId, color: &ColorId) -> Self {
        Operation::RemoveFromRelationship {
            palette: palette.clone(),
            color: color.clone(),
        }
    }

    pub fn replace_relationship(palette: &PaletteId, new: BTreeSet<ColorId>) -> Self {
        Operation::ReplaceRelationship {
            palette: palette.clone(),
            old: None,
            new,
        }
    }

    /// Set a palette's `colorOrder`
    pub fn set_color_order(palette: &PaletteId, order: Vec<ColorId>) -> Self {
        Operation::update_attribute(RecordKey::palette(palette), Attribute::ColorOrder(order))
    }

    /// The record this operation primarily targets
    pub fn key(&self) -> RecordKey {
        match self {
            Operation::AddRecord { record } => record.key(),
            Operation::UpdateAttribute { key, .. } | Operation::RemoveRecord { key, .. } => {
                key.clone()
            }
            Operation::AddToRelationship { palette, .. }
            | Operation::RemoveFromRelationship { palette, .. }
            | Operation::ReplaceRelationship { palette, .. } => RecordKey::palette(palette),
        }
    }

    /// Every record whose observable state this operation can change
    pub fn touched_keys(&self) -> Vec<RecordKey> {
        match self {
            Operation::AddToRelationship { palette, color }
            | Operation::RemoveFromRelationship { palette, color } => {
                vec![RecordKey::palette(palette), RecordKey::color(color)]
            }
            Operation::ReplaceRelationship { palette, old, new } => {
                let mut keys = vec![RecordKey::palette(palette)];
                let changed = match old {
                    Some(old) => old.symmetric_difference(new).cloned().collect::<Vec<_>>(),
                    None => new.iter().cloned().collect(),
                };
                keys.extend(changed.iter().map(RecordKey::color));
                keys
            }
            _ => vec![self.key()],
        }
    }

    /// True for operations that change palette membership or order
    pub fn is_structural(&self) -> bool {
        match self {
            Operation::AddToRelationship { .. }
            | Operation::RemoveFromRelationship { .. }
            | Operation::ReplaceRelationship { .. } => true,
            Operation::UpdateAttribute { new, .. } => matches!(new, Attribute::ColorOrder(_)),
            Operation::RemoveRecord { key, .. } => key.as_palette().is_some(),
            Operation::AddRecord { .. } => false,
        }
    }

    /// The operation that undoes this one
    ///
    /// Returns `None` when the `old` side was never resolved.
    pub fn inverse(&self) -> Option<Operation> {
        Some(match self {
            Operation::AddRecord { record } => Operation::RemoveRecord {
                key: record.key(),
                record: Some(record.clone()),
            },
            Operation::UpdateAttribute { key, old, new } => Operation::UpdateAttribute {
                key: key.clone(),
                old: Some(new.clone()),
                new: old.clone()?,
            },
            Operation::RemoveRecord { record, .. } => Operation::AddRecord {
                record: record.clone()?,
            },
            Operation::AddToRelationship { palette, color } => Operation::RemoveFromRelationship {
                palette: palette.clone(),
                color: color.clone(),
            },
            Operation::RemoveFromRelationship { palette, color } => Operation::AddToRelationship {
                palette: palette.clone(),
                color: color.clone(),
            },
            Operation::ReplaceRelationship { palette, old, new } => {
                Operation::ReplaceRelationship {
                    palette: palette.clone(),
                    old: Some(new.clone()),
                    new: old.clone()?,
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
