// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync status command

use super::SwRuntime;
use crate::output::{print, OutputFormat};
use serde::Serialize;
use std::fmt;
use sw_engine::{PersistenceStatus, RemoteStatus};
use sw_storage::StorageBackend;

#[derive(Serialize)]
struct StatusReport {
    palettes: usize,
    colors: usize,
    persistence: String,
    remote: String,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "palettes:    {}", self.palettes)?;
        writeln!(f, "colors:      {}", self.colors)?;
        writeln!(f, "persistence: {}", self.persistence)?;
        write!(f, "remote:      {}", self.remote)
    }
}

fn persistence_label(status: &PersistenceStatus) -> String {
    match status {
        PersistenceStatus::Healthy => "healthy".to_string(),
        PersistenceStatus::Retrying { attempts } => format!("retrying ({} attempts)", attempts),
        PersistenceStatus::Degraded(warning) => format!("degraded: {}", warning),
    }
}

fn remote_label(status: &RemoteStatus) -> String {
    match status {
        RemoteStatus::Inactive => "inactive".to_string(),
        RemoteStatus::Ready => "ready".to_string(),
        RemoteStatus::Active => "active".to_string(),
        RemoteStatus::Retrying { attempts, error } => {
            format!("retrying ({} attempts): {}", attempts, error)
        }
        RemoteStatus::Failed { transaction, error } => {
            format!("failed (transaction {}): {}", transaction, error)
        }
        RemoteStatus::Deactivated { reason } => format!("deactivated: {}", reason),
    }
}

pub fn handle<B: StorageBackend>(runtime: &SwRuntime<B>, format: OutputFormat) {
    let state = runtime.snapshot();
    let status = runtime.status();
    let report = StatusReport {
        palettes: state.palettes.values().filter(|p| !p.is_color_history).count(),
        colors: state.colors.len(),
        persistence: persistence_label(&status.persistence),
        remote: remote_label(&status.remote),
    };
    print(&report, format);
}
