// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronization strategy table
//!
//! Each rule maps an event on a source store to an action on a target. The
//! coordinator consults the table on every commit and every query instead of
//! hard-wiring propagation paths.

use std::fmt;
use sw_core::{LogEntry, Origin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreName {
    Cache,
    Durable,
    Remote,
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreName::Cache => write!(f, "cache"),
            StoreName::Durable => write!(f, "durable"),
            StoreName::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Update,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Forward committed entries to the target
    Propagate,
    /// Fetch from the target and merge into the source
    Pull,
    /// Trace committed entries
    Log,
}

/// Condition a rule needs before it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFilter {
    Always,
    /// Remote store is active
    RemoteActive,
    /// Queries are configured to trigger pulls
    PullOnQuery,
    /// Skip entries that came from this origin
    SkipOrigin(Origin),
}

/// Live facts a filter is evaluated against
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterContext {
    pub remote_active: bool,
    pub pull_on_query: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStrategy {
    pub name: &'static str,
    pub source: StoreName,
    pub on: EventKind,
    pub target: Option<StoreName>,
    pub action: SyncAction,
    pub filters: Vec<RuleFilter>,
}

impl SyncStrategy {
    /// Whether the rule fires in this context
    pub fn applies(&self, ctx: &FilterContext) -> bool {
        self.filters.iter().all(|f| match f {
            RuleFilter::Always | RuleFilter::SkipOrigin(_) => true,
            RuleFilter::RemoteActive => ctx.remote_active,
            RuleFilter::PullOnQuery => ctx.pull_on_query,
        })
    }

    /// Whether a single entry passes the rule's per-entry filters
    pub fn admits(&self, entry: &LogEntry) -> bool {
        self.filters.iter().all(|f| match f {
            RuleFilter::SkipOrigin(origin) => entry.origin != *origin,
            _ => true,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StrategyTable {
    rules: Vec<SyncStrategy>,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::new(vec![
            SyncStrategy {
                name: "cache-update-durable",
                source: StoreName::Cache,
                on: EventKind::Update,
                target: Some(StoreName::Durable),
                action: SyncAction::Propagate,
                filters: vec![RuleFilter::Always],
            },
            SyncStrategy {
                name: "cache-update-remote",
                source: StoreName::Cache,
                on: EventKind::Update,
                target: Some(StoreName::Remote),
                action: SyncAction::Propagate,
                filters: vec![
                    RuleFilter::RemoteActive,
                    RuleFilter::SkipOrigin(Origin::Remote),
                ],
            },
            SyncStrategy {
                name: "cache-query-remote-pull",
                source: StoreName::Cache,
                on: EventKind::Query,
                target: Some(StoreName::Remote),
                action: SyncAction::Pull,
                filters: vec![RuleFilter::RemoteActive, RuleFilter::PullOnQuery],
            },
            SyncStrategy {
                name: "event-logging",
                source: StoreName::Cache,
                on: EventKind::Update,
                target: None,
                action: SyncAction::Log,
                filters: vec![RuleFilter::Always],
            },
        ])
    }
}

impl StrategyTable {
    pub fn new(rules: Vec<SyncStrategy>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SyncStrategy] {
        &self.rules
    }

    /// Rules triggered by `on` events of `source`
    pub fn matching(
        &self,
        source: StoreName,
        on: EventKind,
    ) -> impl Iterator<Item = &SyncStrategy> {
        self.rules
            .iter()
            .filter(move |r| r.source == source && r.on == on)
    }

    /// Whether any propagate rule targeting `target` admits the entry
    pub fn admits(&self, target: StoreName, entry: &LogEntry) -> bool {
        self.rules
            .iter()
            .filter(|r| r.action == SyncAction::Propagate && r.target == Some(target))
            .any(|r| r.admits(entry))
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
