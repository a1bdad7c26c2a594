// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op remote adapter for offline-only deployments.

use super::{RemoteAdapter, RemoteError};
use async_trait::async_trait;
use sw_core::{Operation, Record};

/// Remote adapter that accepts everything and stores nothing.
///
/// Used when no remote backend is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpRemoteAdapter;

impl NoOpRemoteAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteAdapter for NoOpRemoteAdapter {
    async fn update(&self, _token: &str, _operations: &[Operation]) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn query_all(&self, _token: &str) -> Result<Vec<Record>, RemoteError> {
        Ok(Vec::new())
    }
}
