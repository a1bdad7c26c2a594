// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable synchronization status

use std::sync::Arc;
use sw_core::PersistenceDegraded;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PersistenceStatus {
    #[default]
    Healthy,
    Retrying {
        attempts: u32,
    },
    Degraded(PersistenceDegraded),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RemoteStatus {
    /// No remote session in play
    #[default]
    Inactive,
    /// Activated, waiting for `synchronize()`
    Ready,
    /// Receiving propagated changes
    Active,
    /// Last batch failed; retrying with backoff
    Retrying { attempts: u32, error: String },
    /// A transaction the remote kept refusing was abandoned
    Failed { transaction: u64, error: String },
    /// Stopped after the remote refused the session
    Deactivated { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncStatus {
    pub persistence: PersistenceStatus,
    pub remote: RemoteStatus,
}

impl SyncStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self.persistence, PersistenceStatus::Degraded(_))
    }
}

/// Publishes status changes to any number of watchers
#[derive(Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<SyncStatus>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(SyncStatus::default());
        Self { tx: Arc::new(tx) }
    }
}

impl StatusBoard {
    pub fn current(&self) -> SyncStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.tx.subscribe()
    }

    pub fn set_persistence(&self, status: PersistenceStatus) {
        self.tx.send_if_modified(|s| {
            let changed = s.persistence != status;
            s.persistence = status;
            changed
        });
    }

    pub fn set_remote(&self, status: RemoteStatus) {
        self.tx.send_if_modified(|s| {
            let changed = s.remote != status;
            s.remote = status;
            changed
        });
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
