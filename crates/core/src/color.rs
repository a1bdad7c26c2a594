// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Color records
//!
//! A color keeps its channels in one [`Rgba`] value and derives the hex string
//! from it, so the two representations cannot drift apart.

use crate::error::SchemaViolation;
use crate::id::ColorId;
use crate::record::RecordKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Red, green, blue channels plus alpha in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRgba", into = "RawRgba")]
pub struct Rgba {
    r: u8,
    g: u8,
    b: u8,
    a: f64,
}

#[derive(Serialize, Deserialize)]
struct RawRgba {
    r: u8,
    g: u8,
    b: u8,
    a: f64,
}

impl TryFrom<RawRgba> for Rgba {
    type Error = SchemaViolation;

    fn try_from(raw: RawRgba) -> Result<Self, Self::Error> {
        Rgba::new(raw.r, raw.g, raw.b, raw.a)
    }
}

impl From<Rgba> for RawRgba {
    fn from(c: Rgba) -> Self {
        RawRgba {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Result<Self, SchemaViolation> {
        if !a.is_finite() || !(0.0..=1.0).contains(&a) {
            return Err(SchemaViolation::InvalidAttribute {
                attribute: "a",
                reason: format!("alpha {} outside 0.0..=1.0", a),
            });
        }
        Ok(Self { r, g, b, a })
    }

    /// Opaque color
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self, SchemaViolation> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || SchemaViolation::InvalidAttribute {
            attribute: "hex",
            reason: format!("`{}` is not a 3, 6 or 8 digit hex color", hex),
        };
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => digits.to_string(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());

        let r = channel(0)?;
        let g = channel(2)?;
        let b = channel(4)?;
        let a = if expanded.len() == 8 {
            f64::from(channel(6)?) / 255.0
        } else {
            1.0
        };
        Rgba::new(r, g, b, a)
    }

    pub fn r(&self) -> u8 {
        self.r
    }

    pub fn g(&self) -> u8 {
        self.g
    }

    pub fn b(&self) -> u8 {
        self.b
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    /// `#rrggbb` for opaque colors, `#rrggbbaa` otherwise
    pub fn hex(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = (self.a * 255.0).round() as u8;
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, alpha)
        }
    }
}

/// A single swatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
    pub rgba: Rgba,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub index: i64,
}

impl Color {
    pub fn new(
        id: impl Into<ColorId>,
        name: impl Into<String>,
        rgba: Rgba,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SchemaViolation> {
        let color = Self {
            id: id.into(),
            name: name.into(),
            rgba,
            created_at,
            index: 0,
        };
        color.validate()?;
        Ok(color)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.id.as_str().is_empty() {
            return Err(SchemaViolation::MissingAttribute {
                kind: RecordKind::Color,
                attribute: "id",
            });
        }
        if self.name.trim().is_empty() {
            return Err(SchemaViolation::MissingAttribute {
                kind: RecordKind::Color,
                attribute: "name",
            });
        }
        Ok(())
    }

    pub fn hex(&self) -> String {
        self.rgba.hex()
    }

    /// Attribute-wise comparison, unlike `==` which compares identity
    pub fn same_values(&self, other: &Color) -> bool {
        self.name == other.name
            && self.rgba == other.rgba
            && self.created_at == other.created_at
            && self.index == other.index
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Color {}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
