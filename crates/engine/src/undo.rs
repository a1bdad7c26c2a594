// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-palette undo/redo
//!
//! The manager observes cache commits and records a checkpoint of the
//! palette's `colorOrder` after every structural change. Undo and redo
//! restore a checkpoint through the cache's normal update path, tagged
//! `Origin::Undo` so the restore itself is not recorded as a new step.
//!
//! Deleting a palette is a step of its own. Colors and palettes removed
//! along the way are kept in a graveyard so a restore can bring them back
//! under their original ids; an entry lives as long as some checkpoint
//! still refers to it.

use crate::cache::{CacheStore, CommitObserver};
use crate::error::UndoError;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;
use sw_core::{
    Attribute, Clock, Color, ColorId, InvariantViolation, LogEntry, MaterializedState, Operation,
    Origin, Palette, PaletteId, Record, RecordKey, UpdateError,
};

/// Captured `colorOrder` of one palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub color_order: Vec<ColorId>,
    /// Log sequence of the entry that produced this state (0 for the baseline)
    pub seq: u64,
    /// The palette had been deleted
    pub removed: bool,
}

impl Checkpoint {
    fn baseline(color_order: Vec<ColorId>, seq: u64) -> Self {
        Self {
            color_order,
            seq,
            removed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    /// Nothing recorded beyond the baseline
    Clean,
    Dirty { cursor: usize },
}

#[derive(Debug, Default)]
struct History {
    checkpoints: VecDeque<Checkpoint>,
    cursor: usize,
}

impl History {
    fn starting_at(checkpoint: Checkpoint) -> Self {
        Self {
            checkpoints: VecDeque::from([checkpoint]),
            cursor: 0,
        }
    }

    fn push(&mut self, checkpoint: Checkpoint, depth: usize) {
        self.checkpoints.truncate(self.cursor + 1);
        self.checkpoints.push_back(checkpoint);
        while self.checkpoints.len() > depth + 1 {
            self.checkpoints.pop_front();
        }
        self.cursor = self.checkpoints.len() - 1;
    }
}

/// Records removed while some checkpoint still needs them
#[derive(Debug, Default, Clone)]
struct Graveyard {
    colors: HashMap<ColorId, Color>,
    palettes: HashMap<PaletteId, Palette>,
}

#[derive(Default)]
struct UndoInner {
    histories: HashMap<PaletteId, History>,
    graveyard: Graveyard,
}

impl UndoInner {
    fn prune_graveyard(&mut self) {
        let histories = &self.histories;
        self.graveyard.colors.retain(|id, _| {
            histories
                .values()
                .flat_map(|h| h.checkpoints.iter())
                .any(|c| !c.removed && c.color_order.contains(id))
        });
        self.graveyard.palettes.retain(|id, _| histories.contains_key(id));
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Back,
    Forward,
}

pub struct UndoManager {
    depth: usize,
    inner: Mutex<UndoInner>,
}

impl UndoManager {
    /// `depth` is the number of undo steps kept per palette
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            inner: Mutex::new(UndoInner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UndoInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start tracking palettes that already exist, e.g. after loading
    pub fn track(&self, state: &MaterializedState) {
        let mut inner = self.lock();
        for palette in state.palettes.values() {
            inner
                .histories
                .entry(palette.id.clone())
                .or_insert_with(|| {
                    History::starting_at(Checkpoint::baseline(palette.color_order.clone(), 0))
                });
        }
    }

    pub fn state(&self, palette: &PaletteId) -> UndoState {
        match self.lock().histories.get(palette) {
            Some(h) if h.checkpoints.len() > 1 => UndoState::Dirty { cursor: h.cursor },
            _ => UndoState::Clean,
        }
    }

    pub fn can_undo(&self, palette: &PaletteId) -> bool {
        self.lock().histories.get(palette).is_some_and(|h| h.cursor > 0)
    }

    pub fn can_redo(&self, palette: &PaletteId) -> bool {
        self.lock()
            .histories
            .get(palette)
            .is_some_and(|h| h.cursor + 1 < h.checkpoints.len())
    }

    pub fn checkpoints(&self, palette: &PaletteId) -> Vec<Checkpoint> {
        self.lock()
            .histories
            .get(palette)
            .map(|h| h.checkpoints.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.histories.clear();
        inner.graveyard = Graveyard::default();
    }

    /// Removed colors still held for a possible restore
    pub fn graveyard_len(&self) -> usize {
        self.lock().graveyard.colors.len()
    }

    pub async fn undo<C: Clock>(
        &self,
        cache: &CacheStore<C>,
        palette: &PaletteId,
    ) -> Result<Vec<LogEntry>, UndoError> {
        self.step(cache, palette, Direction::Back).await
    }

    pub async fn redo<C: Clock>(
        &self,
        cache: &CacheStore<C>,
        palette: &PaletteId,
    ) -> Result<Vec<LogEntry>, UndoError> {
        self.step(cache, palette, Direction::Forward).await
    }

    async fn step<C: Clock>(
        &self,
        cache: &CacheStore<C>,
        palette: &PaletteId,
        direction: Direction,
    ) -> Result<Vec<LogEntry>, UndoError> {
        let guard = cache.lock([RecordKey::palette(palette)]).await;

        let (target, checkpoint) = {
            let inner = self.lock();
            let history = inner.histories.get(palette);
            let target = match direction {
                Direction::Back => history
                    .and_then(|h| h.cursor.checked_sub(1))
                    .ok_or(UndoError::NothingToUndo)?,
                Direction::Forward => history
                    .map(|h| h.cursor + 1)
                    .filter(|next| history.is_some_and(|h| *next < h.checkpoints.len()))
                    .ok_or(UndoError::NothingToRedo)?,
            };
            let checkpoint = history
                .and_then(|h| h.checkpoints.get(target))
                .cloned()
                .ok_or(UndoError::NothingToUndo)?;
            (target, checkpoint)
        };

        let operations = {
            let graveyard = self.lock().graveyard.clone();
            cache.read(|state| restore(state, palette, &checkpoint, &graveyard))?
        };
        let entries = cache.apply(&guard, operations, Origin::Undo)?;

        if let Some(history) = self.lock().histories.get_mut(palette) {
            history.cursor = target;
        }
        tracing::info!(
            palette = %palette,
            cursor = target,
            entries = entries.len(),
            "restored checkpoint"
        );
        Ok(entries)
    }
}

impl CommitObserver for UndoManager {
    fn on_commit(&self, entries: &[LogEntry]) {
        let mut inner = self.lock();

        // First old and last new colorOrder per palette in this batch
        let mut changes: BTreeMap<PaletteId, (Option<Vec<ColorId>>, Vec<ColorId>, u64)> =
            BTreeMap::new();
        let mut removed: Vec<(Palette, u64)> = Vec::new();

        for entry in entries {
            match &entry.operation {
                Operation::RemoveRecord {
                    record: Some(Record::Color(color)),
                    ..
                } => {
                    inner.graveyard.colors.insert(color.id.clone(), color.clone());
                }
                Operation::RemoveRecord {
                    record: Some(Record::Palette(palette)),
                    ..
                } => {
                    changes.remove(&palette.id);
                    match entry.origin {
                        Origin::Local => removed.push((palette.clone(), entry.seq)),
                        Origin::Undo => {}
                        Origin::Remote => {
                            inner.histories.remove(&palette.id);
                        }
                    }
                }
                Operation::AddRecord {
                    record: Record::Palette(palette),
                } if entry.origin != Origin::Undo => {
                    inner.histories.insert(
                        palette.id.clone(),
                        History::starting_at(Checkpoint::baseline(
                            palette.color_order.clone(),
                            entry.seq,
                        )),
                    );
                }
                Operation::UpdateAttribute {
                    key,
                    old,
                    new: Attribute::ColorOrder(order),
                } if entry.origin != Origin::Undo => {
                    let Some(id) = key.as_palette() else {
                        continue;
                    };
                    let old = match old {
                        Some(Attribute::ColorOrder(old)) => Some(old.clone()),
                        _ => None,
                    };
                    changes
                        .entry(id)
                        .and_modify(|(_, new, seq)| {
                            *new = order.clone();
                            *seq = entry.seq;
                        })
                        .or_insert((old, order.clone(), entry.seq));
                }
                _ => {}
            }
        }

        let depth = self.depth;
        for (id, (old, new, seq)) in changes {
            let history = inner.histories.entry(id).or_insert_with(|| {
                History::starting_at(Checkpoint::baseline(old.unwrap_or_default(), 0))
            });
            history.push(Checkpoint::baseline(new, seq), depth);
        }

        for (palette, seq) in removed {
            let history = inner
                .histories
                .entry(palette.id.clone())
                .or_insert_with(|| {
                    History::starting_at(Checkpoint::baseline(palette.color_order.clone(), 0))
                });
            history.push(
                Checkpoint {
                    color_order: Vec::new(),
                    seq,
                    removed: true,
                },
                depth,
            );
            inner.graveyard.palettes.insert(palette.id.clone(), palette);
        }

        inner.prune_graveyard();
    }
}

/// Batch that puts `palette` back to `checkpoint`
fn restore(
    state: &MaterializedState,
    palette: &PaletteId,
    checkpoint: &Checkpoint,
    graveyard: &Graveyard,
) -> Result<Vec<Operation>, UpdateError> {
    let missing = |key: RecordKey| InvariantViolation::MissingRecord { key };
    let target = &checkpoint.color_order;
    let wanted: BTreeSet<ColorId> = target.iter().cloned().collect();

    let Some(current) = state.palette(palette) else {
        if checkpoint.removed {
            return Ok(Vec::new());
        }
        let mut revived = graveyard
            .palettes
            .get(palette)
            .cloned()
            .ok_or_else(|| missing(RecordKey::palette(palette)))?;
        revived.colors = wanted.clone();
        revived.color_order = target.clone();
        let mut operations = revive_colors(state, &wanted, graveyard)?;
        operations.push(Operation::add_record(revived));
        return Ok(operations);
    };

    if checkpoint.removed {
        return Ok(vec![Operation::remove_record(current.key())]);
    }

    let mut operations = revive_colors(state, &wanted, graveyard)?;

    if current.colors != wanted {
        operations.push(Operation::replace_relationship(palette, wanted.clone()));
    }
    operations.push(Operation::set_color_order(palette, target.to_vec()));

    // Colors this restore leaves without any palette
    for id in current.colors.difference(&wanted) {
        let elsewhere = state
            .palettes_containing(id)
            .iter()
            .any(|other| other != palette);
        if !elsewhere {
            operations.push(Operation::remove_record(RecordKey::color(id)));
        }
    }
    Ok(operations)
}

/// Re-add colors in `wanted` that no longer exist
fn revive_colors(
    state: &MaterializedState,
    wanted: &BTreeSet<ColorId>,
    graveyard: &Graveyard,
) -> Result<Vec<Operation>, UpdateError> {
    let mut operations = Vec::new();
    for id in wanted {
        if state.color(id).is_some() {
            continue;
        }
        let color = graveyard
            .colors
            .get(id)
            .cloned()
            .ok_or_else(|| InvariantViolation::MissingRecord {
                key: RecordKey::color(id),
            })?;
        operations.push(Operation::add_record(color));
    }
    Ok(operations)
}

#[cfg(test)]
#[path = "undo_tests.rs"]
mod tests;
