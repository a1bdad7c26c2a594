// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Initial pull-then-reconcile between local state and the remote store
//!
//! Attribute conflicts resolve in favor of the remote copy. Relational
//! differences (membership and `colorOrder`) resolve in favor of the local
//! copy. Records removed locally during this session are removed remotely
//! rather than pulled back.

use std::collections::{BTreeSet, HashSet};
use sw_core::{AttributeName, ColorId, MaterializedState, Operation, Palette, Record, RecordKey};

/// Operations that bring both sides to the same state
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reconciliation {
    /// Applied to the cache
    pub pull: Vec<Operation>,
    /// Sent to the remote store
    pub push: Vec<Operation>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.pull.is_empty() && self.push.is_empty()
    }
}

pub fn reconcile(
    local: &MaterializedState,
    remote: &[Record],
    retired: &HashSet<RecordKey>,
) -> Reconciliation {
    let remote = MaterializedState::from_records(remote.iter().cloned());
    let mut out = Reconciliation::default();

    // Colors that exist locally once the pull lands
    let mut available: BTreeSet<ColorId> = local.colors.keys().cloned().collect();

    for (id, theirs) in &remote.colors {
        let key = RecordKey::color(id);
        match local.color(id) {
            None if retired.contains(&key) => {}
            None => {
                out.pull.push(Operation::add_record(theirs.clone()));
                available.insert(id.clone());
            }
            Some(ours) => pull_attribute_changes(
                &mut out.pull,
                &Record::from(ours.clone()),
                &Record::from(theirs.clone()),
            ),
        }
    }
    for (id, ours) in &local.colors {
        if !remote.colors.contains_key(id) {
            out.push.push(Operation::add_record(ours.clone()));
        }
    }

    let mut relational = Vec::new();
    for (id, theirs) in &remote.palettes {
        match local.palette(id) {
            None if retired.contains(&RecordKey::palette(id)) => {}
            None => {
                let pulled = without_missing(theirs, &available);
                if pulled.colors != theirs.colors || pulled.color_order != theirs.color_order {
                    relational.push(Operation::replace_relationship(id, pulled.colors.clone()));
                    relational.push(Operation::set_color_order(id, pulled.color_order.clone()));
                }
                out.pull.push(Operation::add_record(pulled));
            }
            Some(ours) => {
                pull_attribute_changes(
                    &mut out.pull,
                    &Record::from(ours.clone()),
                    &Record::from(theirs.clone()),
                );
                if ours.colors != theirs.colors {
                    relational.push(Operation::replace_relationship(id, ours.colors.clone()));
                }
                if ours.color_order != theirs.color_order {
                    relational.push(Operation::set_color_order(id, ours.color_order.clone()));
                }
            }
        }
    }
    for (id, ours) in &local.palettes {
        if !remote.palettes.contains_key(id) {
            out.push.push(Operation::add_record(ours.clone()));
        }
    }
    out.push.extend(relational);

    for id in remote.palettes.keys() {
        let key = RecordKey::palette(id);
        if local.palette(id).is_none() && retired.contains(&key) {
            out.push.push(Operation::remove_record(key));
        }
    }
    for id in remote.colors.keys() {
        let key = RecordKey::color(id);
        if local.color(id).is_none() && retired.contains(&key) {
            out.push.push(Operation::remove_record(key));
        }
    }

    out
}

/// Cache-side half of a reconciliation for a background pull
///
/// Records with local changes the remote has not acknowledged keep their
/// local values; the remote worker is about to send them.
pub fn background_pull(
    local: &MaterializedState,
    remote: &[Record],
    retired: &HashSet<RecordKey>,
    unsent: &HashSet<RecordKey>,
) -> Vec<Operation> {
    let mut pull = reconcile(local, remote, retired).pull;
    pull.retain(|op| !unsent.contains(&op.key()));
    pull
}

/// Remote wins on scalar attributes; `colorOrder` is relational and stays local
fn pull_attribute_changes(pull: &mut Vec<Operation>, ours: &Record, theirs: &Record) {
    let mine = ours.attributes();
    for attribute in theirs.attributes() {
        if attribute.name() == AttributeName::ColorOrder {
            continue;
        }
        if !mine.contains(&attribute) {
            pull.push(Operation::update_attribute(ours.key(), attribute));
        }
    }
}

/// Drop references to colors that will not exist locally
fn without_missing(palette: &Palette, available: &BTreeSet<ColorId>) -> Palette {
    let mut palette = palette.clone();
    palette.colors.retain(|c| available.contains(c));
    let mut order: Vec<ColorId> = palette
        .color_order
        .iter()
        .filter(|c| palette.colors.contains(*c))
        .cloned()
        .collect();
    // Members missing from the order go at the end
    for color in &palette.colors {
        if !order.contains(color) {
            order.push(color.clone());
        }
    }
    palette.color_order = order;
    palette
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
