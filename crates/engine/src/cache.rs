// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cache store: the in-memory source of truth
//!
//! Batches commit atomically under a single state lock. Per-record entity
//! locks (fair tokio mutexes, acquired in key order) serialize batches that
//! touch the same record in arrival order while disjoint batches proceed
//! concurrently. Live queries and commit observers are notified before
//! `update` returns.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};
use sw_core::{
    Attribute, Clock, InvariantViolation, LogEntry, MaterializedState, Operation, OperationLog,
    Origin, PaletteId, Query, QueryResult, Record, RecordKey, UpdateError,
};
use tokio::sync::{mpsc, OwnedMutexGuard};

/// Receives every committed batch, in commit order
///
/// Called while the cache state lock is held: implementations must not call
/// back into the cache.
pub trait CommitObserver: Send + Sync + 'static {
    fn on_commit(&self, entries: &[LogEntry]);
}

type EntityLocks = Mutex<HashMap<RecordKey, Arc<tokio::sync::Mutex<()>>>>;

struct LiveSubscription {
    id: u64,
    query: Query,
    last: QueryResult,
    tx: mpsc::UnboundedSender<QueryResult>,
}

struct CacheState {
    records: MaterializedState,
    log: OperationLog,
    retired: HashSet<RecordKey>,
    live: Vec<LiveSubscription>,
    next_live_id: u64,
}

impl CacheState {
    fn refresh_live(&mut self, keys: Option<&[RecordKey]>) {
        let records = &self.records;
        self.live.retain_mut(|sub| {
            if let Some(keys) = keys {
                if !sub.query.is_affected_by(keys, records) {
                    return true;
                }
            }
            let next = sub.query.evaluate(records);
            if next.same_values(&sub.last) {
                return true;
            }
            sub.last = next.clone();
            sub.tx.send(next).is_ok()
        });
    }
}

/// Exclusive hold on a set of records
///
/// Dropping the guard releases the records and prunes idle lock entries.
pub struct EntityGuard {
    keys: Vec<RecordKey>,
    guards: Vec<OwnedMutexGuard<()>>,
    locks: Weak<EntityLocks>,
}

impl EntityGuard {
    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }
}

impl Drop for EntityGuard {
    fn drop(&mut self) {
        self.guards.clear();
        let Some(locks) = self.locks.upgrade() else {
            return;
        };
        let mut locks = locks.lock().unwrap_or_else(|e| e.into_inner());
        for key in &self.keys {
            if locks.get(key).is_some_and(|m| Arc::strong_count(m) == 1) {
                locks.remove(key);
            }
        }
    }
}

/// A query whose result is re-delivered after every commit that changes it
pub struct LiveQuery {
    id: u64,
    initial: QueryResult,
    rx: mpsc::UnboundedReceiver<QueryResult>,
    registry: Weak<Mutex<CacheState>>,
}

impl LiveQuery {
    /// Result at subscription time
    pub fn snapshot(&self) -> &QueryResult {
        &self.initial
    }

    /// Wait for the next changed result; `None` once the cache is gone
    pub async fn next(&mut self) -> Option<QueryResult> {
        self.rx.recv().await
    }

    /// Next changed result already delivered, if any
    pub fn try_next(&mut self) -> Option<QueryResult> {
        self.rx.try_recv().ok()
    }

    /// Drain delivered results and return the newest
    pub fn latest(&mut self) -> Option<QueryResult> {
        let mut latest = None;
        while let Ok(result) = self.rx.try_recv() {
            latest = Some(result);
        }
        latest
    }

    pub fn release(self) {}
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        if let Some(state) = self.registry.upgrade() {
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            state.live.retain(|sub| sub.id != self.id);
        }
    }
}

/// Authoritative in-memory store
pub struct CacheStore<C: Clock> {
    clock: C,
    state: Arc<Mutex<CacheState>>,
    locks: Arc<EntityLocks>,
    observers: Arc<Mutex<Vec<Arc<dyn CommitObserver>>>>,
}

impl<C: Clock> Clone for CacheStore<C> {
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            state: Arc::clone(&self.state),
            locks: Arc::clone(&self.locks),
            observers: Arc::clone(&self.observers),
        }
    }
}

impl<C: Clock> CacheStore<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(CacheState {
                records: MaterializedState::new(),
                log: OperationLog::new(),
                retired: HashSet::new(),
                live: Vec::new(),
                next_live_id: 1,
            })),
            locks: Arc::new(Mutex::new(HashMap::new())),
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn observe(&self, observer: Arc<dyn CommitObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    /// Acquire entity locks for `keys`, waiting behind earlier holders
    pub async fn lock(&self, keys: impl IntoIterator<Item = RecordKey>) -> EntityGuard {
        let keys: Vec<RecordKey> = keys
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mutexes: Vec<_> = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            keys.iter()
                .map(|k| Arc::clone(locks.entry(k.clone()).or_default()))
                .collect()
        };
        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }
        EntityGuard {
            keys,
            guards,
            locks: Arc::downgrade(&self.locks),
        }
    }

    /// Apply a batch atomically
    ///
    /// Returns the committed entries; empty when every operation was already
    /// satisfied by the current state.
    pub async fn update(
        &self,
        operations: Vec<Operation>,
        origin: Origin,
    ) -> Result<Vec<LogEntry>, UpdateError> {
        let guard = self.lock(operations.iter().map(Operation::key)).await;
        self.apply(&guard, operations, origin)
    }

    /// Lock `keys`, plan a batch against current state and commit it in one step
    pub async fn update_with<F, E>(
        &self,
        keys: impl IntoIterator<Item = RecordKey>,
        origin: Origin,
        plan: F,
    ) -> Result<Vec<LogEntry>, E>
    where
        F: FnOnce(&MaterializedState) -> Result<Vec<Operation>, E>,
        E: From<UpdateError>,
    {
        self.update_at_head(keys, origin, plan)
            .await
            .map(|(entries, _)| entries)
    }

    /// Like `update_with`, also returning the log head the plan was made against
    pub async fn update_at_head<F, E>(
        &self,
        keys: impl IntoIterator<Item = RecordKey>,
        origin: Origin,
        plan: F,
    ) -> Result<(Vec<LogEntry>, u64), E>
    where
        F: FnOnce(&MaterializedState) -> Result<Vec<Operation>, E>,
        E: From<UpdateError>,
    {
        let _guard = self.lock(keys).await;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let head = state.log.head();
        let operations = plan(&state.records)?;
        let entries = self.commit(&mut state, operations, origin)?;
        Ok((entries, head))
    }

    /// Like `update_with`, also passing the records touched by local or undo
    /// commits after `since`
    pub async fn update_beside_local<F, E>(
        &self,
        keys: impl IntoIterator<Item = RecordKey>,
        origin: Origin,
        since: u64,
        plan: F,
    ) -> Result<Vec<LogEntry>, E>
    where
        F: FnOnce(&MaterializedState, &HashSet<RecordKey>) -> Result<Vec<Operation>, E>,
        E: From<UpdateError>,
    {
        let _guard = self.lock(keys).await;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let local: HashSet<RecordKey> = state
            .log
            .entries_after(since)
            .iter()
            .filter(|e| e.origin != Origin::Remote)
            .flat_map(|e| e.operation.touched_keys())
            .collect();
        let operations = plan(&state.records, &local)?;
        Ok(self.commit(&mut state, operations, origin)?)
    }

    /// Commit a batch under entity locks the caller already holds
    pub fn apply(
        &self,
        _guard: &EntityGuard,
        operations: Vec<Operation>,
        origin: Origin,
    ) -> Result<Vec<LogEntry>, UpdateError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.commit(&mut state, operations, origin)
    }

    fn commit(
        &self,
        state: &mut CacheState,
        operations: Vec<Operation>,
        origin: Origin,
    ) -> Result<Vec<LogEntry>, UpdateError> {
        let mut applied: Vec<Operation> = Vec::with_capacity(operations.len());
        for op in &operations {
            let outcome = check_operation(state, op, origin).and_then(|()| state.records.apply(op));
            match outcome {
                Ok(Some(resolved)) => applied.push(resolved),
                Ok(None) => {}
                Err(e) => {
                    rollback(&mut state.records, &applied);
                    tracing::debug!(origin = origin_label(origin), error = %e, "batch rejected");
                    return Err(e);
                }
            }
        }

        let touched: BTreeSet<PaletteId> = applied
            .iter()
            .flat_map(Operation::touched_keys)
            .filter_map(|k| k.as_palette())
            .collect();
        for id in &touched {
            if state.records.palette(id).is_some_and(|p| !p.order_matches()) {
                rollback(&mut state.records, &applied);
                return Err(InvariantViolation::OrderMismatch {
                    palette: id.clone(),
                }
                .into());
            }
        }

        if applied.is_empty() {
            return Ok(Vec::new());
        }

        let transaction = state.log.begin_transaction();
        let now = self.clock.now();
        let entries: Vec<LogEntry> = applied
            .into_iter()
            .map(|op| state.log.append(transaction, origin, now, op))
            .collect();

        for entry in &entries {
            match &entry.operation {
                Operation::RemoveRecord { key, .. } => {
                    state.retired.insert(key.clone());
                }
                Operation::AddRecord { record } => {
                    state.retired.remove(&record.key());
                }
                _ => {}
            }
        }

        tracing::debug!(
            transaction,
            origin = origin_label(origin),
            count = entries.len(),
            "batch committed"
        );

        let keys: Vec<RecordKey> = entries
            .iter()
            .flat_map(|e| e.operation.touched_keys())
            .collect();
        state.refresh_live(Some(&keys));

        let observers = self.observers.lock().unwrap_or_else(|e| e.into_inner()).clone();
        for observer in observers {
            observer.on_commit(&entries);
        }

        Ok(entries)
    }

    pub fn query(&self, query: &Query) -> QueryResult {
        self.read(|records| query.evaluate(records))
    }

    /// Subscribe to a query's result
    pub fn live_query(&self, query: Query) -> LiveQuery {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let id = state.next_live_id;
        state.next_live_id += 1;
        let initial = query.evaluate(&state.records);
        state.live.push(LiveSubscription {
            id,
            query,
            last: initial.clone(),
            tx,
        });
        LiveQuery {
            id,
            initial,
            rx,
            registry: Arc::downgrade(&self.state),
        }
    }

    pub fn read<T>(&self, f: impl FnOnce(&MaterializedState) -> T) -> T {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&state.records)
    }

    pub fn snapshot(&self) -> MaterializedState {
        self.read(MaterializedState::clone)
    }

    pub fn get(&self, key: &RecordKey) -> Option<Record> {
        self.read(|records| records.get(key))
    }

    pub fn log_head(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .log
            .head()
    }

    pub fn entries_after(&self, seq: u64) -> Vec<LogEntry> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .log
            .entries_after(seq)
    }

    /// Drop log entries every downstream store has absorbed
    pub fn compact_log(&self, through: u64) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .log
            .compact_through(through);
    }

    pub fn log_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .log
            .len()
    }

    /// Replace the record set without producing log entries
    pub fn seed(&self, records: impl IntoIterator<Item = Record>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.records = MaterializedState::from_records(records);
        state.refresh_live(None);
    }

    /// Drop every record; the log keeps its sequence counter
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.records.clear();
        let head = state.log.head();
        state.log.compact_through(head);
        state.refresh_live(None);
    }

    pub fn is_retired(&self, key: &RecordKey) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retired
            .contains(key)
    }

    /// Ids removed during this session
    pub fn retired(&self) -> HashSet<RecordKey> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retired
            .clone()
    }
}

/// Rules that depend on more than the single record an operation targets
fn check_operation(
    state: &CacheState,
    op: &Operation,
    origin: Origin,
) -> Result<(), UpdateError> {
    if op.is_structural() {
        if let Some(id) = op.key().as_palette() {
            if state.records.palette(&id).is_some_and(|p| p.is_locked) {
                return Err(InvariantViolation::LockedPalette { palette: id }.into());
            }
        }
    }

    if let Operation::UpdateAttribute {
        key,
        new: Attribute::ColorOrder(order),
        ..
    } = op
    {
        if let Some(palette) = key.as_palette().and_then(|id| state.records.palette(&id)) {
            let same_members = order.iter().collect::<BTreeSet<_>>()
                == palette.color_order.iter().collect::<BTreeSet<_>>();
            if palette.is_color_history && same_members && order != &palette.color_order {
                return Err(InvariantViolation::ColorHistoryReorder {
                    palette: palette.id.clone(),
                }
                .into());
            }
        }
    }

    if let Operation::AddRecord { record } = op {
        let key = record.key();
        if origin != Origin::Undo && state.retired.contains(&key) {
            return Err(InvariantViolation::IdReuse { key }.into());
        }
    }

    Ok(())
}

fn rollback(records: &mut MaterializedState, applied: &[Operation]) {
    for op in applied.iter().rev() {
        let Some(inverse) = op.inverse() else {
            continue;
        };
        if let Err(e) = records.apply(&inverse) {
            tracing::error!(error = %e, key = %op.key(), "rollback step failed");
        }
    }
}

fn origin_label(origin: Origin) -> &'static str {
    match origin {
        Origin::Local => "local",
        Origin::Undo => "undo",
        Origin::Remote => "remote",
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
