// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake remote adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RemoteAdapter, RemoteError};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sw_core::{MaterializedState, Operation, Record, RejectReason};

/// Recorded remote call
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Update {
        token: String,
        operations: Vec<Operation>,
    },
    QueryAll {
        token: String,
    },
}

#[derive(Default)]
struct FakeServer {
    state: MaterializedState,
    calls: Vec<RemoteCall>,
    /// Errors returned by the next calls, in order
    scripted: VecDeque<RemoteError>,
    expired_tokens: HashSet<String>,
    latency: Option<Duration>,
}

/// In-memory remote server
#[derive(Clone, Default)]
pub struct FakeRemoteAdapter {
    server: Arc<Mutex<FakeServer>>,
}

impl FakeRemoteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// Number of update calls, accepted or not
    pub fn update_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RemoteCall::Update { .. }))
            .count()
    }

    /// Records currently held by the server
    pub fn records(&self) -> Vec<Record> {
        self.lock().state.records()
    }

    pub fn state(&self) -> MaterializedState {
        self.lock().state.clone()
    }

    /// Put records on the server without recording a call
    pub fn seed(&self, records: impl IntoIterator<Item = Record>) {
        let mut server = self.lock();
        for record in records {
            server.state.insert(record);
        }
    }

    /// Fail the next call with this error
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().scripted.push_back(error);
    }

    /// Reject every call carrying this token with `AuthExpired`
    pub fn expire_token(&self, token: &str) {
        self.lock().expired_tokens.insert(token.to_string());
    }

    /// Delay every call
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeServer> {
        self.server.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn delay(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check(server: &mut FakeServer, token: &str) -> Result<(), RemoteError> {
        if server.expired_tokens.contains(token) {
            return Err(RemoteError::rejected(RejectReason::AuthExpired));
        }
        match server.scripted.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteAdapter for FakeRemoteAdapter {
    async fn update(&self, token: &str, operations: &[Operation]) -> Result<(), RemoteError> {
        self.delay().await;
        let mut server = self.lock();
        server.calls.push(RemoteCall::Update {
            token: token.to_string(),
            operations: operations.to_vec(),
        });
        Self::check(&mut server, token)?;

        // All or nothing
        let mut next = server.state.clone();
        for op in operations {
            next.apply(op).map_err(|e| {
                RemoteError::rejected(RejectReason::Validation(e.to_string()))
            })?;
        }
        server.state = next;
        Ok(())
    }

    async fn query_all(&self, token: &str) -> Result<Vec<Record>, RemoteError> {
        self.delay().await;
        let mut server = self.lock();
        server.calls.push(RemoteCall::QueryAll {
            token: token.to_string(),
        });
        Self::check(&mut server, token)?;
        Ok(server.state.records())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
