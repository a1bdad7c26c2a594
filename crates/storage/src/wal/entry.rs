// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL entry structure with checksum verification
//!
//! Each line of the log is one entry: a sequence number, a timestamp, the
//! record change, and a CRC32 of the serialized change.

use crate::StorageError;
use serde::{Deserialize, Serialize};
use sw_core::{Record, RecordKey};

/// A record-level change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum WalChange {
    Put { record: Record },
    Delete { key: RecordKey },
}

/// A single entry in the write-ahead log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Monotonically increasing sequence number
    pub sequence: u64,
    /// Microseconds since Unix epoch
    pub timestamp_micros: i64,
    pub change: WalChange,
    /// CRC32 checksum of the serialized change
    pub checksum: u32,
}

impl WalEntry {
    pub fn new(sequence: u64, change: WalChange) -> Self {
        Self::new_with_timestamp(sequence, chrono::Utc::now().timestamp_micros(), change)
    }

    pub fn new_with_timestamp(sequence: u64, timestamp_micros: i64, change: WalChange) -> Self {
        let checksum = Self::calculate_checksum(&change);
        Self {
            sequence,
            timestamp_micros,
            change,
            checksum,
        }
    }

    fn calculate_checksum(change: &WalChange) -> u32 {
        // Records only hold strings, numbers and timestamps, so this cannot fail
        let json = serde_json::to_string(change).unwrap_or_default();
        crc32fast::hash(json.as_bytes())
    }

    /// Verify the checksum matches the change
    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.change)
    }

    /// Serialize to newline-delimited JSON (one line)
    pub fn to_line(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(StorageError::from)
    }

    /// Parse from a single line of JSON
    pub fn from_line(line: &str) -> Result<Self, StorageError> {
        serde_json::from_str(line).map_err(StorageError::from)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
