// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation log
//!
//! The cache appends one entry per applied operation. Each entry gets a
//! sequence number from this log's own counter, and entries produced by one
//! `update` call share a transaction id. Downstream stores remember the last
//! sequence they absorbed in a [`Watermark`], which makes replay idempotent.

use crate::operation::Operation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Where a committed batch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// A user mutation request
    Local,
    /// An undo or redo replay
    Undo,
    /// Changes pulled from the remote store
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub transaction: u64,
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
}

/// Append-only, in-memory log of committed operations
#[derive(Debug, Default)]
pub struct OperationLog {
    next_seq: u64,
    next_transaction: u64,
    entries: VecDeque<LogEntry>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            next_transaction: 1,
            entries: VecDeque::new(),
        }
    }

    pub fn begin_transaction(&mut self) -> u64 {
        let txn = self.next_transaction.max(1);
        self.next_transaction = txn + 1;
        txn
    }

    pub fn append(
        &mut self,
        transaction: u64,
        origin: Origin,
        timestamp: DateTime<Utc>,
        operation: Operation,
    ) -> LogEntry {
        let seq = self.next_seq.max(1);
        self.next_seq = seq + 1;
        let entry = LogEntry {
            seq,
            transaction,
            origin,
            timestamp,
            operation,
        };
        self.entries.push_back(entry.clone());
        entry
    }

    /// Sequence number of the newest entry ever appended (0 when none)
    pub fn head(&self) -> u64 {
        self.next_seq.saturating_sub(1)
    }

    pub fn entries_after(&self, seq: u64) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.seq > seq)
            .cloned()
            .collect()
    }

    /// Drop entries every consumer has absorbed
    pub fn compact_through(&mut self, seq: u64) {
        while self.entries.front().is_some_and(|e| e.seq <= seq) {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Highest sequence number a store has absorbed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Watermark(pub u64);

impl Watermark {
    /// True when the entry is newer than anything absorbed so far
    pub fn admits(&self, entry: &LogEntry) -> bool {
        entry.seq > self.0
    }

    pub fn advance(&mut self, seq: u64) {
        self.0 = self.0.max(seq);
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
