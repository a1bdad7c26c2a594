// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Durable storage backends
//!
//! Every backend stores whole records keyed by kind and id. The engine's
//! durable store sits on top and decides what to write; backends only need
//! `get`, `put`, `delete` and `list_all`.

mod json;
mod memory;
pub mod traced;
pub mod wal;

pub use json::JsonFileBackend;
pub use memory::MemoryBackend;
pub use traced::TracedBackend;
pub use wal::WalBackend;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBackend, StorageCall};

use async_trait::async_trait;
use sw_core::{Record, RecordKey};
use thiserror::Error;

/// Errors from storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid record key: {0}")]
    InvalidKey(String),
    #[error("stored record {key} does not match its location")]
    Mismatch { key: RecordKey },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Key-value substrate for the durable store
#[async_trait]
pub trait StorageBackend: Clone + Send + Sync + 'static {
    /// Read one record
    async fn get(&self, key: &RecordKey) -> Result<Option<Record>, StorageError>;

    /// Insert or overwrite a record
    async fn put(&self, record: &Record) -> Result<(), StorageError>;

    /// Delete a record; deleting a missing record succeeds
    async fn delete(&self, key: &RecordKey) -> Result<(), StorageError>;

    /// Every stored record, colors before palettes
    async fn list_all(&self) -> Result<Vec<Record>, StorageError>;

    /// Remove every record
    async fn clear(&self) -> Result<(), StorageError> {
        for record in self.list_all().await? {
            self.delete(&record.key()).await?;
        }
        Ok(())
    }
}

/// Sort records so colors precede the palettes that reference them
pub(crate) fn sort_records(records: &mut [Record]) {
    records.sort_by_key(|r| r.key());
}
