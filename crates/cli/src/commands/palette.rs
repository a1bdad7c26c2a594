// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Palette commands

use super::{resolve_palette, SwRuntime};
use crate::output::{print_list, OutputFormat, PaletteRow};
use clap::Subcommand;
use sw_core::{Query, QueryResult};
use sw_storage::StorageBackend;

#[derive(Subcommand)]
pub enum PaletteCommand {
    /// List palettes
    List {
        /// Only favorites
        #[arg(long)]
        favorites: bool,
    },
    /// Create a palette
    Create {
        /// Palette name
        name: Option<String>,
    },
    /// Delete a palette
    Delete { palette: String },
    /// Rename a palette
    Rename { palette: String, name: String },
    /// Lock a palette against structural changes
    Lock { palette: String },
    /// Unlock a palette
    Unlock { palette: String },
    /// Toggle the favorite flag
    Favorite { palette: String },
}

pub async fn handle<B: StorageBackend>(
    runtime: &SwRuntime<B>,
    command: PaletteCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let resolve = |query: &str| resolve_palette(&runtime.snapshot(), query);
    match command {
        PaletteCommand::List { favorites } => {
            let QueryResult::Palettes(palettes) = runtime.query(&Query::Palettes {
                favorites_only: favorites,
            }) else {
                anyhow::bail!("unexpected query result");
            };
            let rows: Vec<PaletteRow> = palettes.iter().map(PaletteRow::from).collect();
            print_list(&rows, format, "No palettes");
        }
        PaletteCommand::Create { name } => {
            let id = runtime.create_palette(name.as_deref()).await?;
            println!("Created palette {}", id);
        }
        PaletteCommand::Delete { palette } => {
            let id = resolve(&palette)?;
            runtime.delete_palette(&id).await?;
            println!("Deleted palette {}", id);
        }
        PaletteCommand::Rename { palette, name } => {
            let id = resolve(&palette)?;
            runtime.rename_palette(&id, &name).await?;
            println!("Renamed palette {} to {}", id, name);
        }
        PaletteCommand::Lock { palette } => {
            let id = resolve(&palette)?;
            runtime.set_locked(&id, true).await?;
            println!("Locked palette {}", id);
        }
        PaletteCommand::Unlock { palette } => {
            let id = resolve(&palette)?;
            runtime.set_locked(&id, false).await?;
            println!("Unlocked palette {}", id);
        }
        PaletteCommand::Favorite { palette } => {
            let id = resolve(&palette)?;
            runtime.toggle_favorite(&id).await?;
            let favorite = runtime
                .snapshot()
                .palette(&id)
                .is_some_and(|p| p.is_favorite);
            if favorite {
                println!("Marked palette {} as favorite", id);
            } else {
                println!("Removed palette {} from favorites", id);
            }
        }
    }
    Ok(())
}
