// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator: routes cache commits to the durable and remote stores
//!
//! The cache's operation log is the propagation queue. Each downstream store
//! keeps a watermark into it and a worker task that catches up whenever the
//! strategy table says a commit concerns it. Workers retry with backoff and
//! report through the status board; a failure downstream never reaches the
//! caller of `update`.

use crate::cache::{CacheStore, CommitObserver};
use crate::config::EngineConfig;
use crate::durable::DurableStore;
use crate::error::RuntimeError;
use crate::reconcile::{background_pull, reconcile, Reconciliation};
use crate::remote::{RemoteState, RemoteStore};
use crate::retry::{RetryAction, RetryState};
use crate::status::{PersistenceStatus, RemoteStatus, StatusBoard, SyncStatus};
use crate::strategy::{EventKind, FilterContext, StoreName, StrategyTable, SyncAction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use sw_adapters::{RemoteAdapter, RemoteError};
use sw_core::traced::format_fields;
use sw_core::{Clock, LogEntry, Origin, PaletteId, PersistenceDegraded, Record, TracedOperation};
use sw_storage::StorageBackend;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

/// Outcome of an initial remote synchronization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub pulled: usize,
    pub pushed: usize,
    /// The remote's color-history palette, if it has one
    pub remote_history: Option<PaletteId>,
}

struct Shared<B: StorageBackend, R: RemoteAdapter, C: Clock> {
    cache: CacheStore<C>,
    durable: DurableStore<B>,
    remote: RemoteStore<R>,
    table: StrategyTable,
    config: EngineConfig,
    status: StatusBoard,
    durable_wake: Notify,
    remote_wake: Notify,
    activated: AtomicBool,
    loaded: AtomicBool,
    pulling: AtomicBool,
}

impl<B: StorageBackend, R: RemoteAdapter, C: Clock> Shared<B, R, C> {
    fn filter_context(&self) -> FilterContext {
        FilterContext {
            remote_active: self.remote.is_active(),
            pull_on_query: self.config.pull_on_query,
        }
    }

    /// Drop log entries every active downstream store has absorbed
    ///
    /// Held back while a pull is in flight: it reads local changes newer than
    /// the remote watermark it started from.
    fn compact(&self) {
        if self.pulling.load(Ordering::SeqCst) {
            return;
        }
        let mut through = self.durable.watermark().0;
        if self.remote.is_active() {
            through = through.min(self.remote.watermark().0);
        }
        self.cache.compact_log(through);
    }

    fn remote_refused(&self, error: &RemoteError) {
        self.remote.deactivate();
        self.status.set_remote(RemoteStatus::Deactivated {
            reason: error.to_string(),
        });
        tracing::warn!(error = %error, "remote store deactivated");
    }
}

/// Commit hook that wakes workers and traces entries per the strategy table
struct Propagation<B: StorageBackend, R: RemoteAdapter, C: Clock> {
    shared: Weak<Shared<B, R, C>>,
}

impl<B: StorageBackend, R: RemoteAdapter, C: Clock> CommitObserver for Propagation<B, R, C> {
    fn on_commit(&self, entries: &[LogEntry]) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let ctx = shared.filter_context();
        for rule in shared
            .table
            .matching(StoreName::Cache, EventKind::Update)
            .filter(|r| r.applies(&ctx))
        {
            match (rule.action, rule.target) {
                (SyncAction::Propagate, Some(StoreName::Durable)) => {
                    shared.durable_wake.notify_one()
                }
                (SyncAction::Propagate, Some(StoreName::Remote)) => {
                    if entries.iter().any(|e| rule.admits(e)) {
                        shared.remote_wake.notify_one();
                    }
                }
                (SyncAction::Log, _) => {
                    for entry in entries {
                        tracing::debug!(
                            rule = rule.name,
                            op = entry.name(),
                            "{}",
                            format_fields(&entry.fields())
                        );
                    }
                }
                _ => {}
            }
        }
    }
}

pub struct Coordinator<B: StorageBackend, R: RemoteAdapter, C: Clock> {
    shared: Arc<Shared<B, R, C>>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: StorageBackend, R: RemoteAdapter, C: Clock> Coordinator<B, R, C> {
    pub fn new(
        cache: CacheStore<C>,
        durable: DurableStore<B>,
        remote: RemoteStore<R>,
        table: StrategyTable,
        config: EngineConfig,
    ) -> Self {
        let shared = Arc::new(Shared {
            cache,
            durable,
            remote,
            table,
            config,
            status: StatusBoard::default(),
            durable_wake: Notify::new(),
            remote_wake: Notify::new(),
            activated: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
            pulling: AtomicBool::new(false),
        });
        shared.cache.observe(Arc::new(Propagation {
            shared: Arc::downgrade(&shared),
        }));
        Self {
            shared,
            shutdown: Mutex::new(None),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn cache(&self) -> &CacheStore<C> {
        &self.shared.cache
    }

    pub fn durable(&self) -> &DurableStore<B> {
        &self.shared.durable
    }

    pub fn remote(&self) -> &RemoteStore<R> {
        &self.shared.remote
    }

    pub fn strategies(&self) -> &StrategyTable {
        &self.shared.table
    }

    pub fn status(&self) -> SyncStatus {
        self.shared.status.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    pub fn is_activated(&self) -> bool {
        self.shared.activated.load(Ordering::SeqCst)
    }

    /// Load durable records (first time only), start propagation, and ready
    /// the remote store if a session is present
    pub async fn activate(&self) -> Result<(), RuntimeError> {
        let shared = &self.shared;
        if !shared.activated.load(Ordering::SeqCst) {
            if !shared.loaded.swap(true, Ordering::SeqCst) {
                let records = match shared.durable.load_all().await {
                    Ok(records) => records,
                    Err(e) => {
                        shared.loaded.store(false, Ordering::SeqCst);
                        return Err(e.into());
                    }
                };
                shared.cache.seed(records);
                shared.durable.set_watermark(shared.cache.log_head());
            }
            self.spawn_workers();
            shared.activated.store(true, Ordering::SeqCst);
            tracing::info!("coordinator activated");
        }

        if shared.remote.state() == RemoteState::Inactive && shared.remote.activate() {
            shared.status.set_remote(RemoteStatus::Ready);
            tracing::info!("remote store ready");
        }
        Ok(())
    }

    fn spawn_workers(&self) {
        let (tx, rx) = watch::channel(false);
        *self.shutdown.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        let durable = tokio::spawn(durable_worker(Arc::clone(&self.shared), rx.clone()));
        let remote = tokio::spawn(remote_worker(Arc::clone(&self.shared), rx));
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        workers.push(durable);
        workers.push(remote);
    }

    /// Pull everything from the remote, reconcile, and start propagating
    pub async fn synchronize(&self) -> Result<SyncReport, RuntimeError> {
        let shared = &self.shared;
        if !self.is_activated() {
            return Err(RuntimeError::NotActivated);
        }
        if shared.remote.session().token().is_none() {
            return Err(RuntimeError::NotAuthenticated);
        }
        if shared.remote.state() == RemoteState::Inactive && !shared.remote.activate() {
            return Err(RuntimeError::RemoteNotReady);
        }

        let records = match shared.remote.query_all().await {
            Ok(records) => records,
            Err(e) => {
                if e.is_auth_expired() {
                    shared.remote_refused(&e);
                }
                return Err(e.into());
            }
        };
        let remote_history = records.iter().find_map(|r| match r {
            Record::Palette(p) if p.is_color_history => Some(p.id.clone()),
            _ => None,
        });

        let retired = shared.cache.retired();
        let keys: Vec<_> = records.iter().map(Record::key).collect();
        let mut push = Vec::new();
        let (pulled, head) = shared
            .cache
            .update_at_head(keys, Origin::Remote, |local| {
                let Reconciliation { pull, push: outgoing } = reconcile(local, &records, &retired);
                push = outgoing;
                Ok::<_, RuntimeError>(pull)
            })
            .await?;

        if !push.is_empty() {
            if let Err(e) = shared.remote.update(&push).await {
                if e.is_auth_expired() {
                    shared.remote_refused(&e);
                }
                return Err(e.into());
            }
        }

        shared.remote.mark_active(head);
        shared.status.set_remote(RemoteStatus::Active);
        shared.remote_wake.notify_one();
        tracing::info!(
            pulled = pulled.len(),
            pushed = push.len(),
            head,
            "remote store synchronized"
        );
        Ok(SyncReport {
            pulled: pulled.len(),
            pushed: push.len(),
            remote_history,
        })
    }

    /// Run query-triggered rules; pulls happen in the background
    pub fn on_query(&self) {
        let shared = &self.shared;
        if !self.is_activated() {
            return;
        }
        let ctx = shared.filter_context();
        let pull = shared
            .table
            .matching(StoreName::Cache, EventKind::Query)
            .any(|r| r.action == SyncAction::Pull && r.applies(&ctx));
        if !pull || shared.pulling.swap(true, Ordering::SeqCst) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            shared.pulling.store(false, Ordering::SeqCst);
            return;
        };
        let task = handle.spawn(pull_from_remote(Arc::clone(shared)));
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        workers.retain(|w| !w.is_finished());
        workers.push(task);
    }

    /// Stop propagation after draining what can be drained
    pub async fn deactivate(&self) {
        if !self.shared.activated.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(tx) = self.shutdown.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = tx.send(true);
        }
        let workers: Vec<_> =
            std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "propagation worker failed");
            }
        }
        self.shared.remote.deactivate();
        self.shared.status.set_remote(RemoteStatus::Inactive);
        tracing::info!(
            pending = self.shared.durable.pending(),
            "coordinator deactivated"
        );
    }

    /// Erase the cache and the durable backend
    pub async fn reset(&self) -> Result<(), RuntimeError> {
        let shared = &self.shared;
        shared.cache.reset();
        shared.durable.reset().await?;
        shared.durable.set_watermark(shared.cache.log_head());
        shared.status.set_persistence(PersistenceStatus::Healthy);
        tracing::info!("local stores reset");
        Ok(())
    }
}

async fn durable_worker<B: StorageBackend, R: RemoteAdapter, C: Clock>(
    shared: Arc<Shared<B, R, C>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let policy = shared.config.persist_retry.clone();
    let mut retry = RetryState::default();
    loop {
        let entries = shared.cache.entries_after(shared.durable.watermark().0);
        shared.durable.absorb(&entries);

        if shared.durable.pending() == 0 {
            shared.compact();
            tokio::select! {
                _ = shared.durable_wake.notified() => continue,
                _ = shutdown.changed() => break,
            }
        }

        match shared.durable.flush().await {
            Ok(_) => {
                if retry.is_failing() {
                    tracing::info!(attempts = retry.attempts, "persistence recovered");
                }
                retry.record_success();
                shared.status.set_persistence(PersistenceStatus::Healthy);
            }
            Err(e) => {
                let delay = match retry.record_failure(&policy, e.to_string()) {
                    RetryAction::Retry { delay } => {
                        tracing::debug!(
                            attempts = retry.attempts,
                            error = %e,
                            "durable write failed"
                        );
                        shared.status.set_persistence(PersistenceStatus::Retrying {
                            attempts: retry.attempts,
                        });
                        delay
                    }
                    RetryAction::Degraded { delay } => {
                        degrade(&shared, &retry);
                        delay
                    }
                    RetryAction::GiveUp => {
                        degrade(&shared, &retry);
                        policy.max_delay
                    }
                };
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => break,
                }
            }
        }
    }

    drain_durable(&shared).await;
}

fn degrade<B: StorageBackend, R: RemoteAdapter, C: Clock>(
    shared: &Shared<B, R, C>,
    retry: &RetryState,
) {
    let warning = PersistenceDegraded {
        attempts: retry.attempts,
        pending: shared.durable.pending(),
        last_error: retry.last_error.clone().unwrap_or_default(),
    };
    tracing::warn!(%warning, "persistence degraded");
    shared
        .status
        .set_persistence(PersistenceStatus::Degraded(warning));
}

/// Final bounded flush on shutdown
async fn drain_durable<B: StorageBackend, R: RemoteAdapter, C: Clock>(shared: &Shared<B, R, C>) {
    let policy = &shared.config.persist_retry;
    let mut retry = RetryState::default();
    let attempts = policy.degrade_after.max(1);
    while retry.attempts < attempts {
        let entries = shared.cache.entries_after(shared.durable.watermark().0);
        match shared.durable.persist(&entries).await {
            Ok(_) => {
                shared.status.set_persistence(PersistenceStatus::Healthy);
                shared.compact();
                return;
            }
            Err(e) => {
                retry.record_failure(policy, e.to_string());
                tokio::time::sleep(policy.delay_for(retry.attempts)).await;
            }
        }
    }
    degrade(shared, &retry);
}

async fn remote_worker<B: StorageBackend, R: RemoteAdapter, C: Clock>(
    shared: Arc<Shared<B, R, C>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let policy = shared.config.remote_retry.clone();
    let mut retry = RetryState::default();
    loop {
        if shared.remote.is_active() {
            let entries = shared.cache.entries_after(shared.remote.watermark().0);
            if !entries.is_empty() {
                let admit = |e: &LogEntry| shared.table.admits(StoreName::Remote, e);
                match shared.remote.propagate(&entries, admit).await {
                    Ok(_) => {
                        if retry.is_failing() {
                            tracing::info!(
                                attempts = retry.attempts,
                                "remote propagation recovered"
                            );
                        }
                        retry.record_success();
                        shared.status.set_remote(RemoteStatus::Active);
                        shared.compact();
                    }
                    Err(e) if e.is_auth_expired() => {
                        retry.record_success();
                        shared.remote_refused(&e);
                    }
                    Err(e) => {
                        let action = retry.record_failure(&policy, e.to_string());
                        shared.status.set_remote(RemoteStatus::Retrying {
                            attempts: retry.attempts,
                            error: e.to_string(),
                        });
                        match action {
                            RetryAction::Retry { delay } | RetryAction::Degraded { delay } => {
                                tracing::debug!(
                                    attempts = retry.attempts,
                                    error = %e,
                                    "remote propagation failed"
                                );
                                tokio::select! {
                                    _ = tokio::time::sleep(delay) => continue,
                                    _ = shutdown.changed() => break,
                                }
                            }
                            RetryAction::GiveUp if e.is_transient() => {
                                tracing::warn!(
                                    attempts = retry.attempts,
                                    error = %e,
                                    "remote propagation paused until next change"
                                );
                                retry.record_success();
                            }
                            RetryAction::GiveUp => {
                                skip_rejected(&shared, &entries, &e, retry.attempts);
                                retry.record_success();
                                continue;
                            }
                        }
                    }
                }
            }
        }
        tokio::select! {
            _ = shared.remote_wake.notified() => {}
            _ = shutdown.changed() => break,
        }
    }

    // Final attempt for whatever is still queued
    if shared.remote.is_active() {
        let entries = shared.cache.entries_after(shared.remote.watermark().0);
        let admit = |e: &LogEntry| shared.table.admits(StoreName::Remote, e);
        if let Err(e) = shared.remote.propagate(&entries, admit).await {
            tracing::warn!(error = %e, "remote entries left unsent at shutdown");
        }
    }
}

/// Abandon the first pending transaction once the remote has refused it
/// `attempts` times, and publish the failure
fn skip_rejected<B: StorageBackend, R: RemoteAdapter, C: Clock>(
    shared: &Shared<B, R, C>,
    entries: &[LogEntry],
    error: &RemoteError,
    attempts: u32,
) {
    let watermark = shared.remote.watermark();
    let Some(first) = entries.iter().find(|e| watermark.admits(e)) else {
        return;
    };
    let last = entries
        .iter()
        .filter(|e| e.transaction == first.transaction)
        .map(|e| e.seq)
        .max()
        .unwrap_or(first.seq);
    tracing::error!(
        transaction = first.transaction,
        attempts,
        error = %error,
        "remote rejected transaction; giving up"
    );
    shared.remote.skip_through(last);
    shared.status.set_remote(RemoteStatus::Failed {
        transaction: first.transaction,
        error: error.to_string(),
    });
}

/// Background pull triggered by a query; failures are skipped
///
/// The watermark is read before the query so local commits the remote may
/// not have seen when it answered are never overwritten.
async fn pull_from_remote<B: StorageBackend, R: RemoteAdapter, C: Clock>(
    shared: Arc<Shared<B, R, C>>,
) {
    let since = shared.remote.watermark().0;
    let result = match shared.remote.query_all().await {
        Ok(records) => {
            let retired = shared.cache.retired();
            let keys: Vec<_> = records.iter().map(Record::key).collect();
            shared
                .cache
                .update_beside_local(keys, Origin::Remote, since, |local, unsent| {
                    Ok::<_, RuntimeError>(background_pull(local, &records, &retired, unsent))
                })
                .await
                .map(|entries| entries.len())
        }
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(0) => {}
        Ok(pulled) => tracing::debug!(pulled, "pulled remote changes"),
        Err(RuntimeError::Remote(e)) if e.is_auth_expired() => shared.remote_refused(&e),
        Err(e) => tracing::debug!(error = %e, "remote pull skipped"),
    }
    shared.pulling.store(false, Ordering::SeqCst);
    shared.compact();
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
