// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake backend for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{MemoryBackend, StorageBackend, StorageError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use sw_core::{Record, RecordKey};

/// Recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Get { key: RecordKey },
    Put { key: RecordKey },
    Delete { key: RecordKey },
    ListAll,
    Clear,
}

#[derive(Default)]
struct FailureState {
    /// Writes left to fail
    failing_writes: u32,
    /// Fail every write until cleared
    unavailable: bool,
}

/// In-memory backend that records calls and can be told to fail writes
#[derive(Clone, Default)]
pub struct FakeBackend {
    records: MemoryBackend,
    calls: Arc<Mutex<Vec<StorageCall>>>,
    failures: Arc<Mutex<FailureState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of put/delete calls made so far, failed ones included
    pub fn write_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StorageCall::Put { .. } | StorageCall::Delete { .. }))
            .count()
    }

    /// Fail the next `n` put/delete calls
    pub fn fail_next_writes(&self, n: u32) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failing_writes = n;
    }

    /// Fail every write until called again with `false`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .unavailable = unavailable;
    }

    /// Seed a record without recording a call
    pub async fn seed(&self, record: Record) {
        let _ = self.records.put(&record).await;
    }

    /// Snapshot of stored records
    pub async fn records(&self) -> Vec<Record> {
        self.records.list_all().await.unwrap_or_default()
    }

    fn record(&self, call: StorageCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn check_write(&self) -> Result<(), StorageError> {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        if failures.unavailable {
            return Err(StorageError::Unavailable("backend offline".to_string()));
        }
        if failures.failing_writes > 0 {
            failures.failing_writes -= 1;
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FakeBackend {
    async fn get(&self, key: &RecordKey) -> Result<Option<Record>, StorageError> {
        self.record(StorageCall::Get { key: key.clone() });
        self.records.get(key).await
    }

    async fn put(&self, record: &Record) -> Result<(), StorageError> {
        self.record(StorageCall::Put { key: record.key() });
        self.check_write()?;
        self.records.put(record).await
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StorageError> {
        self.record(StorageCall::Delete { key: key.clone() });
        self.check_write()?;
        self.records.delete(key).await
    }

    async fn list_all(&self) -> Result<Vec<Record>, StorageError> {
        self.record(StorageCall::ListAll);
        self.records.list_all().await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.record(StorageCall::Clear);
        self.check_write()?;
        self.records.clear().await
    }
}
