// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Color commands

use super::{resolve_color, resolve_palette, SwRuntime};
use crate::output::{print_list, ColorRow, OutputFormat};
use clap::Subcommand;
use sw_core::{Query, Rgba};
use sw_storage::StorageBackend;

#[derive(Subcommand)]
pub enum ColorCommand {
    /// Pick a color: record it in the history, optionally copying it into a palette
    Add {
        /// Hex value, e.g. #ff8800 or f80
        hex: String,
        #[arg(long)]
        name: Option<String>,
        /// Palette to append a copy to
        #[arg(long)]
        palette: Option<String>,
    },
    /// Remove a color from a palette
    Remove {
        palette: String,
        /// Color id, hex or name
        color: String,
    },
    /// List the colors of a palette, or the color history
    List {
        #[arg(long)]
        palette: Option<String>,
    },
}

pub async fn handle<B: StorageBackend>(
    runtime: &SwRuntime<B>,
    command: ColorCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        ColorCommand::Add { hex, name, palette } => {
            let rgba = Rgba::from_hex(&hex)?;
            let target = palette
                .map(|p| resolve_palette(&runtime.snapshot(), &p))
                .transpose()?;
            let name = name.unwrap_or_else(|| rgba.hex());
            let id = runtime.add_color(rgba, &name, target.as_ref()).await?;
            match target {
                Some(palette) => println!("Added {} to history and palette {}", id, palette),
                None => println!("Added {} to history", id),
            }
        }
        ColorCommand::Remove { palette, color } => {
            let state = runtime.snapshot();
            let palette = resolve_palette(&state, &palette)?;
            let color = resolve_color(&state, &palette, &color)?;
            runtime.delete_color(&palette, &color).await?;
            println!("Removed {} from palette {}", color, palette);
        }
        ColorCommand::List { palette } => {
            let query = match palette {
                Some(p) => Query::PaletteColors {
                    id: resolve_palette(&runtime.snapshot(), &p)?,
                },
                None => Query::ColorHistory,
            };
            let result = runtime.query(&query);
            let rows: Vec<ColorRow> = result.colors().iter().map(ColorRow::from).collect();
            print_list(&rows, format, "No colors");
        }
    }
    Ok(())
}
