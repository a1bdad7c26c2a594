// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record identity and attribute access
//!
//! Every store speaks in terms of [`Record`], addressed by [`RecordKey`].
//! Attributes are read and written through [`Attribute`] so operations can
//! carry a single typed value without knowing which record kind owns it.

use crate::color::{Color, Rgba};
use crate::error::SchemaViolation;
use crate::id::{ColorId, PaletteId};
use crate::palette::Palette;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Color,
    Palette,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Color => write!(f, "color"),
            RecordKind::Palette => write!(f, "palette"),
        }
    }
}

/// Type plus id; unique across all records
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub kind: RecordKind,
    pub id: String,
}

impl RecordKey {
    pub fn color(id: &ColorId) -> Self {
        Self {
            kind: RecordKind::Color,
            id: id.as_str().to_string(),
        }
    }

    pub fn palette(id: &PaletteId) -> Self {
        Self {
            kind: RecordKind::Palette,
            id: id.as_str().to_string(),
        }
    }

    pub fn as_color(&self) -> Option<ColorId> {
        (self.kind == RecordKind::Color).then(|| ColorId::from(self.id.as_str()))
    }

    pub fn as_palette(&self) -> Option<PaletteId> {
        (self.kind == RecordKind::Palette).then(|| PaletteId::from(self.id.as_str()))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Names of the scalar attributes a record may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeName {
    Name,
    Rgba,
    CreatedAt,
    Index,
    IsColorHistory,
    IsFavorite,
    IsLocked,
    SelectedColorIndex,
    ColorOrder,
}

impl AttributeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeName::Name => "name",
            AttributeName::Rgba => "rgba",
            AttributeName::CreatedAt => "created_at",
            AttributeName::Index => "index",
            AttributeName::IsColorHistory => "is_color_history",
            AttributeName::IsFavorite => "is_favorite",
            AttributeName::IsLocked => "is_locked",
            AttributeName::SelectedColorIndex => "selected_color_index",
            AttributeName::ColorOrder => "color_order",
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum Attribute {
    Name(String),
    Rgba(Rgba),
    CreatedAt(DateTime<Utc>),
    Index(i64),
    IsColorHistory(bool),
    IsFavorite(bool),
    IsLocked(bool),
    SelectedColorIndex(u32),
    ColorOrder(Vec<ColorId>),
}

impl Attribute {
    pub fn name(&self) -> AttributeName {
        match self {
            Attribute::Name(_) => AttributeName::Name,
            Attribute::Rgba(_) => AttributeName::Rgba,
            Attribute::CreatedAt(_) => AttributeName::CreatedAt,
            Attribute::Index(_) => AttributeName::Index,
            Attribute::IsColorHistory(_) => AttributeName::IsColorHistory,
            Attribute::IsFavorite(_) => AttributeName::IsFavorite,
            Attribute::IsLocked(_) => AttributeName::IsLocked,
            Attribute::SelectedColorIndex(_) => AttributeName::SelectedColorIndex,
            Attribute::ColorOrder(_) => AttributeName::ColorOrder,
        }
    }
}

/// Either record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    Color(Color),
    Palette(Palette),
}

impl Record {
    pub fn key(&self) -> RecordKey {
        match self {
            Record::Color(c) => RecordKey::color(&c.id),
            Record::Palette(p) => RecordKey::palette(&p.id),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Color(_) => RecordKind::Color,
            Record::Palette(_) => RecordKind::Palette,
        }
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        match self {
            Record::Color(c) => c.validate(),
            Record::Palette(p) => p.validate(),
        }
    }

    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Record::Color(c) => Some(c),
            Record::Palette(_) => None,
        }
    }

    pub fn as_palette(&self) -> Option<&Palette> {
        match self {
            Record::Palette(p) => Some(p),
            Record::Color(_) => None,
        }
    }

    /// Attribute-wise comparison of two records with the same key
    pub fn same_values(&self, other: &Record) -> bool {
        match (self, other) {
            (Record::Color(a), Record::Color(b)) => a.id == b.id && a.same_values(b),
            (Record::Palette(a), Record::Palette(b)) => a.id == b.id && a.same_values(b),
            _ => false,
        }
    }

    /// Every scalar attribute the record carries
    pub fn attributes(&self) -> Vec<Attribute> {
        match self {
            Record::Color(c) => vec![
                Attribute::Name(c.name.clone()),
                Attribute::Rgba(c.rgba),
                Attribute::CreatedAt(c.created_at),
                Attribute::Index(c.index),
            ],
            Record::Palette(p) => vec![
                Attribute::Name(p.name.clone()),
                Attribute::CreatedAt(p.created_at),
                Attribute::Index(p.index),
                Attribute::IsColorHistory(p.is_color_history),
                Attribute::IsFavorite(p.is_favorite),
                Attribute::IsLocked(p.is_locked),
                Attribute::SelectedColorIndex(p.selected_color_index),
                Attribute::ColorOrder(p.color_order.clone()),
            ],
        }
    }

    pub fn attribute(&self, name: AttributeName) -> Result<Attribute, SchemaViolation> {
        self.attributes()
            .into_iter()
            .find(|a| a.name() == name)
            .ok_or(SchemaViolation::UnknownAttribute {
                kind: self.kind(),
                attribute: name,
            })
    }

    /// Write one attribute, returning the value it replaced
    pub fn set_attribute(&mut self, value: Attribute) -> Result<Attribute, SchemaViolation> {
        let unknown = SchemaViolation::UnknownAttribute {
            kind: self.kind(),
            attribute: value.name(),
        };
        let old = match (self, value) {
            (Record::Color(c), Attribute::Name(v)) => {
                if v.trim().is_empty() {
                    return Err(SchemaViolation::MissingAttribute {
                        kind: RecordKind::Color,
                        attribute: "name",
                    });
                }
                Attribute::Name(std::mem::replace(&mut c.name, v))
            }
            (Record::Color(c), Attribute::Rgba(v)) => Attribute::Rgba(std::mem::replace(&mut c.rgba, v)),
            (Record::Color(c), Attribute::CreatedAt(v)) => {
                Attribute::CreatedAt(std::mem::replace(&mut c.created_at, v))
            }
            (Record::Color(c), Attribute::Index(v)) => Attribute::Index(std::mem::replace(&mut c.index, v)),
            (Record::Palette(p), Attribute::Name(v)) => {
                if v.trim().is_empty() {
                    return Err(SchemaViolation::MissingAttribute {
                        kind: RecordKind::Palette,
                        attribute: "name",
                    });
                }
                Attribute::Name(std::mem::replace(&mut p.name, v))
            }
            (Record::Palette(p), Attribute::CreatedAt(v)) => {
                Attribute::CreatedAt(std::mem::replace(&mut p.created_at, v))
            }
            (Record::Palette(p), Attribute::Index(v)) => Attribute::Index(std::mem::replace(&mut p.index, v)),
            (Record::Palette(p), Attribute::IsColorHistory(v)) => {
                Attribute::IsColorHistory(std::mem::replace(&mut p.is_color_history, v))
            }
            (Record::Palette(p), Attribute::IsFavorite(v)) => {
                Attribute::IsFavorite(std::mem::replace(&mut p.is_favorite, v))
            }
            (Record::Palette(p), Attribute::IsLocked(v)) => {
                Attribute::IsLocked(std::mem::replace(&mut p.is_locked, v))
            }
            (Record::Palette(p), Attribute::SelectedColorIndex(v)) => {
                Attribute::SelectedColorIndex(std::mem::replace(&mut p.selected_color_index, v))
            }
            (Record::Palette(p), Attribute::ColorOrder(v)) => {
                let old = std::mem::replace(&mut p.color_order, v);
                if let Err(e) = p.validate() {
                    p.color_order = old;
                    return Err(e);
                }
                Attribute::ColorOrder(old)
            }
            _ => return Err(unknown),
        };
        Ok(old)
    }
}

impl From<Color> for Record {
    fn from(c: Color) -> Self {
        Record::Color(c)
    }
}

impl From<Palette> for Record {
    fn from(p: Palette) -> Self {
        Record::Palette(p)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
