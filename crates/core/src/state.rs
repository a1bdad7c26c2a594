// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized record state
//!
//! Applies single operations to an in-memory record set. Cross-operation
//! rules (locking, colorOrder permutation) belong to the cache, which checks
//! them around whole batches; this type only enforces what one operation can
//! get wrong on its own.

use crate::color::Color;
use crate::error::{InvariantViolation, SchemaViolation, UpdateError};
use crate::id::{ColorId, PaletteId};
use crate::operation::Operation;
use crate::palette::Palette;
use crate::record::{Record, RecordKey, RecordKind};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MaterializedState {
    pub colors: BTreeMap<ColorId, Color>,
    pub palettes: BTreeMap<PaletteId, Palette>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from stored records without running batch checks
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut state = Self::new();
        for record in records {
            state.insert(record);
        }
        state
    }

    /// Insert or overwrite a record
    pub fn insert(&mut self, record: Record) {
        match record {
            Record::Color(c) => {
                self.colors.insert(c.id.clone(), c);
            }
            Record::Palette(p) => {
                self.palettes.insert(p.id.clone(), p);
            }
        }
    }

    pub fn get(&self, key: &RecordKey) -> Option<Record> {
        match key.kind {
            RecordKind::Color => self
                .colors
                .get(key.id.as_str())
                .cloned()
                .map(Record::Color),
            RecordKind::Palette => self
                .palettes
                .get(key.id.as_str())
                .cloned()
                .map(Record::Palette),
        }
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        match key.kind {
            RecordKind::Color => self.colors.contains_key(key.id.as_str()),
            RecordKind::Palette => self.palettes.contains_key(key.id.as_str()),
        }
    }

    pub fn remove(&mut self, key: &RecordKey) -> Option<Record> {
        match key.kind {
            RecordKind::Color => self.colors.remove(key.id.as_str()).map(Record::Color),
            RecordKind::Palette => self.palettes.remove(key.id.as_str()).map(Record::Palette),
        }
    }

    pub fn color(&self, id: &ColorId) -> Option<&Color> {
        self.colors.get(id)
    }

    pub fn palette(&self, id: &PaletteId) -> Option<&Palette> {
        self.palettes.get(id)
    }

    /// Colors first, then palettes
    pub fn records(&self) -> Vec<Record> {
        self.colors
            .values()
            .cloned()
            .map(Record::Color)
            .chain(self.palettes.values().cloned().map(Record::Palette))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.palettes.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.palettes.clear();
    }

    /// The first color-history palette, by id
    pub fn color_history(&self) -> Option<&Palette> {
        self.palettes.values().find(|p| p.is_color_history)
    }

    /// Palettes sorted by index, newest first on ties
    pub fn ordered_palettes(&self) -> Vec<&Palette> {
        let mut palettes: Vec<_> = self.palettes.values().collect();
        palettes.sort_by(|a, b| {
            a.index
                .cmp(&b.index)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        palettes
    }

    /// A palette's colors in presentation order
    ///
    /// The color history ignores `color_order` and lists newest colors first.
    pub fn palette_colors(&self, id: &PaletteId) -> Vec<Color> {
        let Some(palette) = self.palettes.get(id) else {
            return Vec::new();
        };
        if palette.is_color_history {
            let mut colors: Vec<Color> = palette
                .colors
                .iter()
                .filter_map(|c| self.colors.get(c).cloned())
                .collect();
            colors.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
            colors
        } else {
            palette
                .color_order
                .iter()
                .filter_map(|c| self.colors.get(c).cloned())
                .collect()
        }
    }

    pub fn palettes_containing(&self, color: &ColorId) -> Vec<PaletteId> {
        self.palettes
            .values()
            .filter(|p| p.colors.contains(color))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Apply one operation
    ///
    /// Returns the operation with its `old` values filled in, or `None` when
    /// the state already matched and nothing changed.
    pub fn apply(&mut self, op: &Operation) -> Result<Option<Operation>, UpdateError> {
        match op {
            Operation::AddRecord { record } => {
                record.validate()?;
                let key = record.key();
                if self.contains(&key) {
                    return Err(InvariantViolation::DuplicateRecord { key }.into());
                }
                if let Record::Palette(p) = record {
                    for color in &p.colors {
                        self.require_color(&key, color)?;
                    }
                }
                self.insert(record.clone());
                Ok(Some(op.clone()))
            }

            Operation::UpdateAttribute { key, new, .. } => {
                let mut record = self.require(key)?;
                let old = record.set_attribute(new.clone())?;
                if &old == new {
                    return Ok(None);
                }
                self.insert(record);
                Ok(Some(Operation::UpdateAttribute {
                    key: key.clone(),
                    old: Some(old),
                    new: new.clone(),
                }))
            }

            Operation::RemoveRecord { key, .. } => {
                if let Some(color) = key.as_color() {
                    if let Some(palette) = self.palettes_containing(&color).first() {
                        return Err(SchemaViolation::DanglingReference {
                            from: RecordKey::palette(palette),
                            to: key.clone(),
                        }
                        .into());
                    }
                }
                let record = self.remove(key).ok_or_else(|| InvariantViolation::MissingRecord {
                    key: key.clone(),
                })?;
                Ok(Some(Operation::RemoveRecord {
                    key: key.clone(),
                    record: Some(record),
                }))
            }

            Operation::AddToRelationship { palette, color } => {
                let key = RecordKey::palette(palette);
                self.require_color(&key, color)?;
                let target = self.palette_mut(palette)?;
                Ok(target.colors.insert(color.clone()).then(|| op.clone()))
            }

            Operation::RemoveFromRelationship { palette, color } => {
                let target = self.palette_mut(palette)?;
                Ok(target.colors.remove(color).then(|| op.clone()))
            }

            Operation::ReplaceRelationship { palette, new, .. } => {
                let key = RecordKey::palette(palette);
                for color in new {
                    self.require_color(&key, color)?;
                }
                let target = self.palette_mut(palette)?;
                if &target.colors == new {
                    return Ok(None);
                }
                let old = std::mem::replace(&mut target.colors, new.clone());
                Ok(Some(Operation::ReplaceRelationship {
                    palette: palette.clone(),
                    old: Some(old),
                    new: new.clone(),
                }))
            }
        }
    }

    fn require(&self, key: &RecordKey) -> Result<Record, InvariantViolation> {
        self.get(key)
            .ok_or_else(|| InvariantViolation::MissingRecord { key: key.clone() })
    }

    fn require_color(&self, from: &RecordKey, color: &ColorId) -> Result<(), SchemaViolation> {
        if self.colors.contains_key(color) {
            Ok(())
        } else {
            Err(SchemaViolation::DanglingReference {
                from: from.clone(),
                to: RecordKey::color(color),
            })
        }
    }

    fn palette_mut(&mut self, id: &PaletteId) -> Result<&mut Palette, InvariantViolation> {
        self.palettes
            .get_mut(id)
            .ok_or_else(|| InvariantViolation::MissingRecord {
                key: RecordKey::palette(id),
            })
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
