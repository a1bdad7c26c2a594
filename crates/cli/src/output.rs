// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use sw_core::{Color, Palette};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list of items, or `empty` when there are none in text mode
pub fn print_list<T: Serialize + fmt::Display>(items: &[T], format: OutputFormat, empty: &str) {
    match format {
        OutputFormat::Text if items.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

#[derive(Serialize)]
pub struct PaletteRow {
    pub id: String,
    pub name: String,
    pub colors: usize,
    pub favorite: bool,
    pub locked: bool,
}

impl From<&Palette> for PaletteRow {
    fn from(p: &Palette) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            colors: p.color_order.len(),
            favorite: p.is_favorite,
            locked: p.is_locked,
        }
    }
}

impl fmt::Display for PaletteRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = match (self.favorite, self.locked) {
            (true, true) => "*L",
            (true, false) => "* ",
            (false, true) => " L",
            (false, false) => "  ",
        };
        write!(
            f,
            "{} {:<36} {:<24} {}",
            flags, self.id, self.name, self.colors
        )
    }
}

#[derive(Serialize)]
pub struct ColorRow {
    pub id: String,
    pub name: String,
    pub hex: String,
}

impl From<&Color> for ColorRow {
    fn from(c: &Color) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            hex: c.rgba.hex(),
        }
    }
}

impl fmt::Display for ColorRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10} {:<36} {}", self.hex, self.id, self.name)
    }
}
