// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::remote::{RemoteAdapter, RemoteError};
use async_trait::async_trait;
use sw_core::{Operation, Record};

/// Wrapper that adds tracing to any RemoteAdapter
#[derive(Clone)]
pub struct TracedRemoteAdapter<R> {
    inner: R,
}

impl<R> TracedRemoteAdapter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: RemoteAdapter> RemoteAdapter for TracedRemoteAdapter<R> {
    async fn update(&self, token: &str, operations: &[Operation]) -> Result<(), RemoteError> {
        let span = tracing::info_span!("remote.update", ops = operations.len());
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.update(token, operations).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "batch accepted"),
            Err(e) if e.is_transient() => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "update failed (will retry)"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "update rejected"
            ),
        }

        result
    }

    async fn query_all(&self, token: &str) -> Result<Vec<Record>, RemoteError> {
        let span = tracing::info_span!("remote.query_all");
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.query_all(token).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(records) => tracing::info!(
                count = records.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "pulled"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "query failed"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
