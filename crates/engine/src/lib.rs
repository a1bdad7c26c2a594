// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Swatches sync engine: cache, durable and remote stores with undo

pub mod actions;
mod cache;
mod config;
mod coordinator;
mod durable;
mod error;
pub mod reconcile;
mod remote;
mod retry;
mod runtime;
mod status;
pub mod strategy;
mod undo;

#[cfg(test)]
mod test_support;

pub use actions::{MoveRequest, NewColor, NEW_PALETTE_NAME};
pub use cache::{CacheStore, CommitObserver, EntityGuard, LiveQuery};
pub use config::{ConfigError, EngineConfig};
pub use coordinator::{Coordinator, SyncReport};
pub use durable::DurableStore;
pub use error::{RuntimeError, UndoError};
pub use remote::{RemoteState, RemoteStore};
pub use retry::{RetryAction, RetryPolicy, RetryState};
pub use runtime::{Runtime, RuntimeDeps};
pub use status::{PersistenceStatus, RemoteStatus, StatusBoard, SyncStatus};
pub use strategy::{StrategyTable, SyncStrategy};
pub use undo::{Checkpoint, UndoManager, UndoState};
