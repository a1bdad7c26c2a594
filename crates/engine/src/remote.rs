// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote store: the network mirror reachable while a session is authenticated

use std::collections::BTreeMap;
use std::sync::Mutex;
use sw_adapters::{RemoteAdapter, RemoteError, SessionSignal};
use sw_core::{LogEntry, Operation, Record, RejectReason, Watermark};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteState {
    #[default]
    Inactive,
    /// Session present; waiting for the initial synchronize
    Ready,
    /// Receiving propagated entries
    Active,
}

#[derive(Default)]
struct RemoteInner {
    state: RemoteState,
    watermark: Watermark,
}

pub struct RemoteStore<R: RemoteAdapter> {
    adapter: R,
    session: SessionSignal,
    inner: Mutex<RemoteInner>,
}

impl<R: RemoteAdapter> RemoteStore<R> {
    pub fn new(adapter: R, session: SessionSignal) -> Self {
        Self {
            adapter,
            session,
            inner: Mutex::new(RemoteInner::default()),
        }
    }

    pub fn session(&self) -> &SessionSignal {
        &self.session
    }

    pub fn state(&self) -> RemoteState {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state
    }

    pub fn is_active(&self) -> bool {
        self.state() == RemoteState::Active
    }

    /// Move to `Ready` if a session is present; returns whether it did
    pub fn activate(&self) -> bool {
        if self.session.token().is_none() {
            return false;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.state == RemoteState::Inactive {
            inner.state = RemoteState::Ready;
        }
        true
    }

    /// Start accepting propagation for entries after `seq`
    pub fn mark_active(&self, seq: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.state = RemoteState::Active;
        inner.watermark = Watermark(seq);
    }

    pub fn deactivate(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state = RemoteState::Inactive;
    }

    pub fn watermark(&self) -> Watermark {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).watermark
    }

    /// Give up on entries up to `seq`
    pub fn skip_through(&self, seq: u64) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .watermark
            .advance(seq);
    }

    fn token(&self) -> Result<String, RemoteError> {
        self.session
            .token()
            .ok_or_else(|| RemoteError::rejected(RejectReason::AuthExpired))
    }

    pub async fn update(&self, operations: &[Operation]) -> Result<(), RemoteError> {
        let token = self.token()?;
        self.adapter.update(&token, operations).await
    }

    pub async fn query_all(&self) -> Result<Vec<Record>, RemoteError> {
        let token = self.token()?;
        self.adapter.query_all(&token).await
    }

    /// Send admitted entries past the watermark, one transaction per call
    ///
    /// The watermark advances after each accepted transaction, so a failure
    /// leaves only the unsent transactions pending.
    pub async fn propagate(
        &self,
        entries: &[LogEntry],
        admit: impl Fn(&LogEntry) -> bool,
    ) -> Result<usize, RemoteError> {
        let watermark = self.watermark();
        let mut transactions: BTreeMap<u64, (u64, Vec<Operation>)> = BTreeMap::new();
        for entry in entries.iter().filter(|e| watermark.admits(e)) {
            let (last, ops) = transactions.entry(entry.transaction).or_default();
            *last = (*last).max(entry.seq);
            if admit(entry) {
                ops.push(entry.operation.clone());
            }
        }

        let mut sent = 0;
        for (transaction, (last, ops)) in transactions {
            if !ops.is_empty() {
                self.update(&ops).await?;
                tracing::debug!(transaction, count = ops.len(), "propagated to remote");
                sent += 1;
            }
            self.skip_through(last);
        }
        Ok(sent)
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
