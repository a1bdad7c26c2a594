// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sw - swatches palette manager

mod commands;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{color, palette, status};
use config::{BackendKind, CliConfig};
use error::SwError;
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use sw_adapters::{NoOpRemoteAdapter, SessionSignal, TracedRemoteAdapter};
use sw_core::{SystemClock, UuidIdGen};
use sw_engine::{EngineConfig, PersistenceStatus, Runtime, RuntimeDeps};
use sw_storage::{JsonFileBackend, MemoryBackend, StorageBackend, TracedBackend, WalBackend};

#[derive(Parser)]
#[command(name = "sw", version, about = "Swatches - palettes and colors")]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend, overriding the config file
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendKind>,

    /// Data directory, overriding the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Palette management
    Palette {
        #[command(subcommand)]
        command: palette::PaletteCommand,
    },
    /// Color management
    Color {
        #[command(subcommand)]
        command: color::ColorCommand,
    },
    /// Show record counts and sync status
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", SwError::from_anyhow(&e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("SW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    let backend = cli.backend.unwrap_or(config.backend);

    match backend {
        BackendKind::Memory => {
            serve(MemoryBackend::new(), config.engine, cli.command, cli.format).await
        }
        BackendKind::Wal => {
            let dir = config.data_dir()?;
            std::fs::create_dir_all(&dir)?;
            let wal = WalBackend::open(&dir.join("swatches.wal"))?;
            serve(wal, config.engine, cli.command, cli.format).await
        }
        BackendKind::Json => {
            let dir = config.data_dir()?;
            std::fs::create_dir_all(&dir)?;
            let json = JsonFileBackend::open(dir.join("records"))?;
            serve(json, config.engine, cli.command, cli.format).await
        }
    }
}

/// Activate, run one command, and drain before exiting
async fn serve<B: StorageBackend>(
    backend: B,
    engine: EngineConfig,
    command: Commands,
    format: OutputFormat,
) -> Result<()> {
    let runtime = Runtime::new(
        RuntimeDeps {
            backend: TracedBackend::new(backend),
            remote: TracedRemoteAdapter::new(NoOpRemoteAdapter),
            session: SessionSignal::default(),
        },
        SystemClock,
        UuidIdGen,
        engine,
    );
    runtime.activate().await?;

    let result = match command {
        Commands::Palette { command } => palette::handle(&runtime, command, format).await,
        Commands::Color { command } => color::handle(&runtime, command, format).await,
        Commands::Status => {
            status::handle(&runtime, format);
            Ok(())
        }
    };

    runtime.deactivate().await;
    if let PersistenceStatus::Degraded(warning) = runtime.status().persistence {
        result?;
        anyhow::bail!("changes were not saved: {}", warning);
    }
    result
}
