// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store: persistent mirror of the cache
//!
//! Absorbs committed log entries into a local mirror and marks each touched
//! record dirty. `flush` writes dirty records to the backend; a record that
//! fails to write stays dirty until a later flush succeeds, so nothing is
//! dropped while persistence is degraded.

use std::collections::BTreeMap;
use std::sync::Mutex;
use sw_core::{LogEntry, MaterializedState, Record, RecordKey, Watermark};
use sw_storage::{StorageBackend, StorageError};

#[derive(Default)]
struct DurableState {
    mirror: MaterializedState,
    /// Dirty keys and the generation they were last dirtied at
    dirty: BTreeMap<RecordKey, u64>,
    generation: u64,
    watermark: Watermark,
}

pub struct DurableStore<B: StorageBackend> {
    backend: B,
    state: Mutex<DurableState>,
}

impl<B: StorageBackend> DurableStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(DurableState::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read every stored record and make it the mirror's baseline
    pub async fn load_all(&self) -> Result<Vec<Record>, StorageError> {
        let records = self.backend.list_all().await?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.mirror = MaterializedState::from_records(records.iter().cloned());
        state.dirty.clear();
        tracing::info!(records = records.len(), "loaded durable store");
        Ok(records)
    }

    /// Take entries newer than the watermark into the mirror
    ///
    /// Returns how many entries were new.
    pub fn absorb(&self, entries: &[LogEntry]) -> usize {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut absorbed = 0;
        for entry in entries {
            if !state.watermark.admits(entry) {
                continue;
            }
            if let Err(e) = state.mirror.apply(&entry.operation) {
                tracing::warn!(seq = entry.seq, error = %e, "durable mirror diverged");
            }
            state.generation += 1;
            let generation = state.generation;
            state.dirty.insert(entry.operation.key(), generation);
            state.watermark.advance(entry.seq);
            absorbed += 1;
        }
        absorbed
    }

    /// Write every dirty record; stops at the first backend failure
    pub async fn flush(&self) -> Result<usize, StorageError> {
        let batch: Vec<(RecordKey, u64, Option<Record>)> = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state
                .dirty
                .iter()
                .map(|(key, generation)| (key.clone(), *generation, state.mirror.get(key)))
                .collect()
        };

        let mut written = 0;
        for (key, generation, record) in batch {
            match &record {
                Some(record) => self.backend.put(record).await?,
                None => self.backend.delete(&key).await?,
            }
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.dirty.get(&key) == Some(&generation) {
                state.dirty.remove(&key);
            }
            written += 1;
        }
        if written > 0 {
            tracing::debug!(written, "flushed durable store");
        }
        Ok(written)
    }

    pub async fn persist(&self, entries: &[LogEntry]) -> Result<usize, StorageError> {
        self.absorb(entries);
        self.flush().await
    }

    /// Records absorbed but not yet written
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .dirty
            .len()
    }

    pub fn watermark(&self) -> Watermark {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).watermark
    }

    /// Skip entries up to `seq`, e.g. after seeding from the backend
    pub fn set_watermark(&self, seq: u64) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .watermark
            .advance(seq);
    }

    /// Erase the backend and the mirror
    pub async fn reset(&self) -> Result<(), StorageError> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.mirror.clear();
            state.dirty.clear();
        }
        self.backend.clear().await
    }
}

#[cfg(test)]
#[path = "durable_tests.rs"]
mod tests;
