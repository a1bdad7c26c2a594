// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime facade for the swatches engine
//!
//! Wires the cache, durable and remote stores, the coordinator and the undo
//! manager together, and turns palette actions into committed batches.

use crate::actions::{self, MoveRequest, NewColor};
use crate::cache::{CacheStore, LiveQuery};
use crate::config::EngineConfig;
use crate::coordinator::{Coordinator, SyncReport};
use crate::durable::DurableStore;
use crate::error::{RuntimeError, UndoError};
use crate::remote::RemoteStore;
use crate::status::SyncStatus;
use crate::strategy::StrategyTable;
use crate::undo::{UndoManager, UndoState};
use std::sync::Arc;
use sw_adapters::{RemoteAdapter, SessionSignal};
use sw_core::{
    Clock, ColorId, IdGen, LogEntry, MaterializedState, Operation, Origin, PaletteId, Query,
    QueryResult, RecordKey, Rgba, UpdateError,
};
use sw_storage::StorageBackend;
use tokio::sync::watch;

/// Runtime adapter dependencies
pub struct RuntimeDeps<B, R> {
    pub backend: B,
    pub remote: R,
    pub session: SessionSignal,
}

/// Runtime that owns every store
pub struct Runtime<B: StorageBackend, R: RemoteAdapter, C: Clock, I: IdGen> {
    coordinator: Coordinator<B, R, C>,
    undo: Arc<UndoManager>,
    clock: C,
    id_gen: I,
}

impl<B, R, C, I> Runtime<B, R, C, I>
where
    B: StorageBackend,
    R: RemoteAdapter,
    C: Clock,
    I: IdGen,
{
    /// Create a new runtime; nothing is loaded until `activate`
    pub fn new(deps: RuntimeDeps<B, R>, clock: C, id_gen: I, config: EngineConfig) -> Self {
        let cache = CacheStore::new(clock.clone());
        let undo = Arc::new(UndoManager::new(config.undo_depth));
        cache.observe(undo.clone());
        let coordinator = Coordinator::new(
            cache,
            DurableStore::new(deps.backend),
            RemoteStore::new(deps.remote, deps.session),
            StrategyTable::default(),
            config,
        );
        Self {
            coordinator,
            undo,
            clock,
            id_gen,
        }
    }

    pub fn coordinator(&self) -> &Coordinator<B, R, C> {
        &self.coordinator
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo
    }

    fn cache(&self) -> &CacheStore<C> {
        self.coordinator.cache()
    }

    // -- lifecycle --

    /// Load durable records, start propagation, and ready the remote store
    /// when a session is present
    pub async fn activate(&self) -> Result<(), RuntimeError> {
        self.coordinator.activate().await?;
        self.cache().read(|state| self.undo.track(state));
        if self.coordinator.remote().session().token().is_none() {
            self.ensure_color_history(None).await?;
        }
        Ok(())
    }

    /// Initial pull-then-reconcile with the remote store
    pub async fn synchronize(&self) -> Result<SyncReport, RuntimeError> {
        let report = self.coordinator.synchronize().await?;
        self.ensure_color_history(report.remote_history.clone())
            .await?;
        Ok(report)
    }

    /// Drain propagation and stop the workers
    pub async fn deactivate(&self) {
        self.coordinator.deactivate().await;
    }

    /// Erase local data and undo histories
    pub async fn reset(&self) -> Result<(), RuntimeError> {
        self.coordinator.reset().await?;
        self.undo.reset();
        Ok(())
    }

    async fn ensure_color_history(
        &self,
        preferred: Option<PaletteId>,
    ) -> Result<Vec<LogEntry>, RuntimeError> {
        let new_id = PaletteId::from(self.id_gen.next());
        let now = self.clock.now();
        let mut keys = self.cache().read(|state| {
            state
                .palettes
                .values()
                .filter(|p| p.is_color_history)
                .map(|p| p.key())
                .collect::<Vec<_>>()
        });
        keys.push(RecordKey::palette(&new_id));
        let entries = self
            .cache()
            .update_with(keys, Origin::Local, |state| {
                Ok::<_, RuntimeError>(actions::ensure_color_history(
                    state,
                    preferred.as_ref(),
                    new_id,
                    now,
                ))
            })
            .await?;
        if !entries.is_empty() {
            tracing::info!(entries = entries.len(), "color history repaired");
        }
        Ok(entries)
    }

    // -- queries --

    pub fn query(&self, query: &Query) -> QueryResult {
        self.coordinator.on_query();
        self.cache().query(query)
    }

    /// Subscribe to a query; the handle yields fresh results until released
    pub fn live_query(&self, query: Query) -> LiveQuery {
        self.coordinator.on_query();
        self.cache().live_query(query)
    }

    pub fn snapshot(&self) -> MaterializedState {
        self.cache().snapshot()
    }

    pub fn status(&self) -> SyncStatus {
        self.coordinator.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.coordinator.subscribe_status()
    }

    pub fn undo_state(&self, palette: &PaletteId) -> UndoState {
        self.undo.state(palette)
    }

    // -- mutations --

    /// Commit a raw operation batch
    pub async fn update(&self, operations: Vec<Operation>) -> Result<Vec<LogEntry>, RuntimeError> {
        self.require_activated()?;
        Ok(self.cache().update(operations, Origin::Local).await?)
    }

    pub async fn undo(&self, palette: &PaletteId) -> Result<Vec<LogEntry>, UndoError> {
        self.undo.undo(self.cache(), palette).await
    }

    pub async fn redo(&self, palette: &PaletteId) -> Result<Vec<LogEntry>, UndoError> {
        self.undo.redo(self.cache(), palette).await
    }

    pub async fn create_palette(&self, name: Option<&str>) -> Result<PaletteId, RuntimeError> {
        let id = PaletteId::from(self.id_gen.next());
        let now = self.clock.now();
        self.mutate([RecordKey::palette(&id)], |_| {
            actions::create_palette(id.clone(), name, now)
        })
        .await?;
        Ok(id)
    }

    pub async fn duplicate_palette(&self, source: &PaletteId) -> Result<PaletteId, RuntimeError> {
        let id = PaletteId::from(self.id_gen.next());
        self.mutate(
            [RecordKey::palette(source), RecordKey::palette(&id)],
            |state| actions::duplicate_palette(state, source, id.clone()),
        )
        .await?;
        Ok(id)
    }

    pub async fn delete_palette(&self, id: &PaletteId) -> Result<Vec<LogEntry>, RuntimeError> {
        self.mutate([RecordKey::palette(id)], |state| {
            actions::delete_palette(state, id)
        })
        .await
    }

    pub async fn rename_palette(
        &self,
        id: &PaletteId,
        name: &str,
    ) -> Result<Vec<LogEntry>, RuntimeError> {
        self.mutate([RecordKey::palette(id)], |state| {
            actions::rename_palette(state, id, name)
        })
        .await
    }

    pub async fn toggle_favorite(&self, id: &PaletteId) -> Result<Vec<LogEntry>, RuntimeError> {
        self.mutate([RecordKey::palette(id)], |state| {
            actions::toggle_favorite(state, id)
        })
        .await
    }

    pub async fn toggle_lock(&self, id: &PaletteId) -> Result<Vec<LogEntry>, RuntimeError> {
        self.mutate([RecordKey::palette(id)], |state| {
            actions::toggle_lock(state, id)
        })
        .await
    }

    pub async fn set_locked(
        &self,
        id: &PaletteId,
        locked: bool,
    ) -> Result<Vec<LogEntry>, RuntimeError> {
        self.mutate([RecordKey::palette(id)], |state| {
            actions::set_locked(state, id, locked)
        })
        .await
    }

    pub async fn set_selected_color_index(
        &self,
        id: &PaletteId,
        index: u32,
    ) -> Result<Vec<LogEntry>, RuntimeError> {
        self.mutate([RecordKey::palette(id)], |state| {
            actions::set_selected_color_index(state, id, index)
        })
        .await
    }

    /// Record a color in the history, with a copy appended to `palette`
    ///
    /// Returns the id of the history color.
    pub async fn add_color(
        &self,
        rgba: Rgba,
        name: &str,
        palette: Option<&PaletteId>,
    ) -> Result<ColorId, RuntimeError> {
        let new = NewColor {
            id: ColorId::from(self.id_gen.next()),
            name: name.to_string(),
            rgba,
            created_at: self.clock.now(),
        };
        let id = new.id.clone();
        let copy = palette.map(|p| (p.clone(), ColorId::from(self.id_gen.next())));

        let mut keys = self.history_keys();
        keys.push(RecordKey::color(&id));
        if let Some((palette, copy_id)) = &copy {
            keys.push(RecordKey::palette(palette));
            keys.push(RecordKey::color(copy_id));
        }
        self.mutate(keys, |state| actions::add_color(state, new, copy))
            .await?;
        Ok(id)
    }

    pub async fn delete_color(
        &self,
        palette: &PaletteId,
        color: &ColorId,
    ) -> Result<Vec<LogEntry>, RuntimeError> {
        self.mutate(
            [RecordKey::palette(palette), RecordKey::color(color)],
            |state| actions::delete_color(state, palette, color),
        )
        .await
    }

    /// Swap a color for an edited copy at the same position
    pub async fn replace_color(
        &self,
        palette: &PaletteId,
        color: &ColorId,
        rgba: Rgba,
        name: &str,
    ) -> Result<ColorId, RuntimeError> {
        let replacement = ColorId::from(self.id_gen.next());
        self.mutate(
            [
                RecordKey::palette(palette),
                RecordKey::color(color),
                RecordKey::color(&replacement),
            ],
            |state| {
                actions::replace_color(state, palette, color, replacement.clone(), rgba, name)
            },
        )
        .await?;
        Ok(replacement)
    }

    pub async fn move_color(&self, request: &MoveRequest) -> Result<Vec<LogEntry>, RuntimeError> {
        if request.is_noop() {
            return Ok(Vec::new());
        }
        let copy_id = ColorId::from(self.id_gen.next());
        let now = self.clock.now();
        self.mutate(
            [
                RecordKey::palette(&request.source),
                RecordKey::palette(&request.target),
                RecordKey::color(&copy_id),
            ],
            |state| actions::move_color(state, request, copy_id.clone(), now),
        )
        .await
    }

    pub async fn reorder_palettes(
        &self,
        source_index: usize,
        target_index: usize,
    ) -> Result<Vec<LogEntry>, RuntimeError> {
        let keys = self.cache().read(|state| {
            state
                .palettes
                .values()
                .filter(|p| !p.is_color_history)
                .map(|p| p.key())
                .collect::<Vec<_>>()
        });
        self.mutate(keys, |state| {
            actions::reorder_palettes(state, source_index, target_index)
        })
        .await
    }

    fn history_keys(&self) -> Vec<RecordKey> {
        self.cache()
            .read(|state| state.color_history().map(|p| p.key()))
            .into_iter()
            .collect()
    }

    fn require_activated(&self) -> Result<(), RuntimeError> {
        if self.coordinator.is_activated() {
            Ok(())
        } else {
            Err(RuntimeError::NotActivated)
        }
    }

    async fn mutate<F>(
        &self,
        keys: impl IntoIterator<Item = RecordKey>,
        plan: F,
    ) -> Result<Vec<LogEntry>, RuntimeError>
    where
        F: FnOnce(&MaterializedState) -> Result<Vec<Operation>, UpdateError>,
    {
        self.require_activated()?;
        let entries = self
            .cache()
            .update_with(keys, Origin::Local, |state| {
                plan(state).map_err(RuntimeError::from)
            })
            .await?;
        tracing::debug!(entries = entries.len(), "action committed");
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
