// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log backend
//!
//! Changes are appended to a JSON-lines file and fsync'd before `put` or
//! `delete` returns. An in-memory index of the latest record per key serves
//! reads. On open, replay stops at the first torn or corrupt line and the file
//! is truncated there. Once enough superseded entries pile up the log is
//! rewritten with one `Put` per live record.

mod entry;

pub use entry::{WalChange, WalEntry};

use crate::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sw_core::{Record, RecordKey};
use tokio::sync::Mutex;

/// Default number of appended entries beyond the live record count that
/// triggers compaction
pub const DEFAULT_COMPACT_THRESHOLD: u64 = 256;

#[derive(Clone)]
pub struct WalBackend {
    inner: Arc<Mutex<WalInner>>,
}

struct WalInner {
    path: PathBuf,
    file: File,
    next_sequence: u64,
    index: BTreeMap<RecordKey, Record>,
    /// Entries currently in the file
    entry_count: u64,
    compact_threshold: u64,
}

/// What replay recovered from an existing file
struct Replay {
    index: BTreeMap<RecordKey, Record>,
    last_sequence: Option<u64>,
    entry_count: u64,
    valid_len: u64,
}

impl WalBackend {
    /// Open or create a WAL file
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_threshold(path, DEFAULT_COMPACT_THRESHOLD)
    }

    pub fn open_with_threshold(path: &Path, compact_threshold: u64) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let replay = replay(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let on_disk = file.metadata()?.len();
        if on_disk > replay.valid_len {
            tracing::warn!(
                path = %path.display(),
                valid_len = replay.valid_len,
                on_disk,
                "truncating torn wal tail"
            );
            file.set_len(replay.valid_len)?;
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(WalInner {
                path: path.to_path_buf(),
                file,
                next_sequence: replay.last_sequence.map(|s| s + 1).unwrap_or(0),
                index: replay.index,
                entry_count: replay.entry_count,
                compact_threshold,
            })),
        })
    }

    /// Next sequence number to be assigned
    pub async fn sequence(&self) -> u64 {
        self.inner.lock().await.next_sequence
    }

    /// Number of entries currently in the file
    pub async fn entry_count(&self) -> u64 {
        self.inner.lock().await.entry_count
    }

    /// Rewrite the log with one entry per live record
    pub async fn compact(&self) -> Result<(), StorageError> {
        self.inner.lock().await.compact()
    }
}

impl WalInner {
    fn append(&mut self, change: WalChange) -> Result<u64, StorageError> {
        let sequence = self.next_sequence;
        let line = WalEntry::new(sequence, change.clone()).to_line()?;

        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.sync_all()?;

        self.next_sequence += 1;
        self.entry_count += 1;
        match change {
            WalChange::Put { record } => {
                self.index.insert(record.key(), record);
            }
            WalChange::Delete { key } => {
                self.index.remove(&key);
            }
        }

        if self.entry_count > self.index.len() as u64 + self.compact_threshold {
            self.compact()?;
        }
        Ok(sequence)
    }

    fn compact(&mut self) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("compact");
        {
            let mut out = File::create(&tmp)?;
            let mut sequence = self.next_sequence;
            for record in self.index.values() {
                let entry = WalEntry::new(
                    sequence,
                    WalChange::Put {
                        record: record.clone(),
                    },
                );
                out.write_all(entry.to_line()?.as_bytes())?;
                out.write_all(b"\n")?;
                sequence += 1;
            }
            out.sync_all()?;
            self.next_sequence = sequence;
        }
        std::fs::rename(&tmp, &self.path)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        let before = self.entry_count;
        self.entry_count = self.index.len() as u64;
        tracing::debug!(
            path = %self.path.display(),
            before,
            after = self.entry_count,
            "compacted wal"
        );
        Ok(())
    }
}

/// Read every valid entry, stopping at the first corrupt one
fn replay(path: &Path) -> Result<Replay, StorageError> {
    let mut result = Replay {
        index: BTreeMap::new(),
        last_sequence: None,
        entry_count: 0,
        valid_len: 0,
    };
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(result),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut position = 0u64;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(n) => n as u64,
            Err(_) => break,
        };
        // A final line without newline is a torn write
        if !line.ends_with('\n') {
            break;
        }
        position += bytes_read;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            result.valid_len = position;
            continue;
        }

        let entry = match WalEntry::from_line(trimmed) {
            Ok(entry) if entry.verify() => entry,
            _ => break,
        };
        match entry.change {
            WalChange::Put { record } => {
                result.index.insert(record.key(), record);
            }
            WalChange::Delete { key } => {
                result.index.remove(&key);
            }
        }
        result.last_sequence = Some(entry.sequence);
        result.entry_count += 1;
        result.valid_len = position;
    }
    Ok(result)
}

#[async_trait]
impl StorageBackend for WalBackend {
    async fn get(&self, key: &RecordKey) -> Result<Option<Record>, StorageError> {
        Ok(self.inner.lock().await.index.get(key).cloned())
    }

    async fn put(&self, record: &Record) -> Result<(), StorageError> {
        self.inner.lock().await.append(WalChange::Put {
            record: record.clone(),
        })?;
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.index.contains_key(key) {
            inner.append(WalChange::Delete { key: key.clone() })?;
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Record>, StorageError> {
        Ok(self.inner.lock().await.index.values().cloned().collect())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.index.clear();
        inner.compact()
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
