// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote store transport

mod noop;

pub use noop::NoOpRemoteAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRemoteAdapter, RemoteCall};

use async_trait::async_trait;
use sw_core::{Operation, Record, RejectReason, RemoteRejected};
use thiserror::Error;

/// Errors from remote calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The server answered and refused the request
    #[error(transparent)]
    Rejected(#[from] RemoteRejected),
    /// The request never got an answer
    #[error("network error: {0}")]
    Network(String),
}

impl RemoteError {
    pub fn rejected(reason: RejectReason) -> Self {
        RemoteError::Rejected(RemoteRejected { reason })
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, RemoteError::Rejected(r) if r.is_auth_expired())
    }

    /// Worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::Network(_)
                | RemoteError::Rejected(RemoteRejected {
                    reason: RejectReason::Conflict(_)
                })
        )
    }
}

/// Adapter for a network-backed record store
///
/// `update` is all-or-nothing: the server applies the whole batch or none of it.
#[async_trait]
pub trait RemoteAdapter: Clone + Send + Sync + 'static {
    /// Apply a batch of operations
    async fn update(&self, token: &str, operations: &[Operation]) -> Result<(), RemoteError>;

    /// Fetch every record the server holds
    async fn query_all(&self, token: &str) -> Result<Vec<Record>, RemoteError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
