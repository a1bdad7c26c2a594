// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Palette records
//!
//! A palette owns a `colors` relationship (membership) and a `color_order`
//! attribute (presentation order). Outside an in-flight batch the order is a
//! permutation of the relationship.

use crate::error::SchemaViolation;
use crate::id::{ColorId, PaletteId};
use crate::record::{RecordKey, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub id: PaletteId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub is_color_history: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub selected_color_index: u32,
    #[serde(default)]
    pub color_order: Vec<ColorId>,
    #[serde(default)]
    pub colors: BTreeSet<ColorId>,
}

impl Palette {
    /// An empty, unlocked, non-history palette
    pub fn new(
        id: impl Into<PaletteId>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
            index: 0,
            is_color_history: false,
            is_favorite: false,
            is_locked: false,
            selected_color_index: 0,
            color_order: Vec::new(),
            colors: BTreeSet::new(),
        }
    }

    /// The singleton palette that records every picked color
    pub fn color_history(id: impl Into<PaletteId>, created_at: DateTime<Utc>) -> Self {
        let mut palette = Self::new(id, "Color History", created_at);
        palette.is_color_history = true;
        palette
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::palette(&self.id)
    }

    /// Set both the relationship and the order from one list
    pub fn with_colors<I, C>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorId>,
    {
        self.color_order = colors.into_iter().map(Into::into).collect();
        self.colors = self.color_order.iter().cloned().collect();
        self
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.id.as_str().is_empty() {
            return Err(SchemaViolation::MissingAttribute {
                kind: RecordKind::Palette,
                attribute: "id",
            });
        }
        if self.name.trim().is_empty() {
            return Err(SchemaViolation::MissingAttribute {
                kind: RecordKind::Palette,
                attribute: "name",
            });
        }
        let mut seen = BTreeSet::new();
        for id in &self.color_order {
            if !seen.insert(id) {
                return Err(SchemaViolation::Cardinality {
                    key: self.key(),
                    reason: format!("color {} appears twice in colorOrder", id),
                });
            }
        }
        Ok(())
    }

    /// True when `color_order` lists exactly the members of `colors`
    pub fn order_matches(&self) -> bool {
        self.color_order.len() == self.colors.len()
            && self.color_order.iter().all(|id| self.colors.contains(id))
    }

    pub fn contains(&self, color: &ColorId) -> bool {
        self.colors.contains(color)
    }

    pub fn position(&self, color: &ColorId) -> Option<usize> {
        self.color_order.iter().position(|id| id == color)
    }

    /// Attribute-wise comparison, unlike `==` which compares identity
    pub fn same_values(&self, other: &Palette) -> bool {
        self.name == other.name
            && self.created_at == other.created_at
            && self.index == other.index
            && self.is_color_history == other.is_color_history
            && self.is_favorite == other.is_favorite
            && self.is_locked == other.is_locked
            && self.selected_color_index == other.selected_color_index
            && self.color_order == other.color_order
            && self.colors == other.colors
    }
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Palette {}

#[cfg(test)]
#[path = "palette_tests.rs"]
mod tests;
