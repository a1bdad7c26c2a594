// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced backend wrapper for consistent observability

use crate::{StorageBackend, StorageError};
use async_trait::async_trait;
use sw_core::{Record, RecordKey};

/// Wrapper that adds tracing to any StorageBackend
#[derive(Clone)]
pub struct TracedBackend<B> {
    inner: B,
}

impl<B> TracedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: StorageBackend> StorageBackend for TracedBackend<B> {
    async fn get(&self, key: &RecordKey) -> Result<Option<Record>, StorageError> {
        let result = self.inner.get(key).await;
        tracing::trace!(%key, found = ?result.as_ref().ok().map(|r| r.is_some()), "storage.get");
        result
    }

    async fn put(&self, record: &Record) -> Result<(), StorageError> {
        let key = record.key();
        let span = tracing::info_span!("storage.put", %key);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.put(record).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "stored"),
            Err(e) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "put failed"
            ),
        }
        result
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StorageError> {
        let span = tracing::info_span!("storage.delete", %key);
        let _guard = span.enter();

        let result = self.inner.delete(key).await;
        match &result {
            Ok(()) => tracing::debug!("deleted"),
            Err(e) => tracing::warn!(error = %e, "delete failed"),
        }
        result
    }

    async fn list_all(&self) -> Result<Vec<Record>, StorageError> {
        let span = tracing::info_span!("storage.list_all");
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.list_all().await;
        let elapsed = start.elapsed();

        match &result {
            Ok(records) => tracing::info!(
                count = records.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "loaded"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "load failed"
            ),
        }
        result
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let result = self.inner.clear().await;
        match &result {
            Ok(()) => tracing::info!("storage cleared"),
            Err(e) => tracing::error!(error = %e, "clear failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
