// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by every store
//!
//! `SchemaViolation` and `InvariantViolation` reject a mutation before it
//! commits. `PersistenceDegraded` and `RemoteRejected` describe failures that
//! happen after a local commit and are reported through sync status instead.

use crate::id::PaletteId;
use crate::record::{AttributeName, RecordKey, RecordKind};
use thiserror::Error;

/// A record that does not conform to its schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("{kind} is missing required attribute `{attribute}`")]
    MissingAttribute {
        kind: RecordKind,
        attribute: &'static str,
    },
    #[error("invalid {attribute}: {reason}")]
    InvalidAttribute {
        attribute: &'static str,
        reason: String,
    },
    #[error("attribute `{attribute}` does not apply to {kind} records")]
    UnknownAttribute {
        kind: RecordKind,
        attribute: AttributeName,
    },
    #[error("relationship `colors` of {key} has wrong cardinality: {reason}")]
    Cardinality { key: RecordKey, reason: String },
    #[error("{from} references missing record {to}")]
    DanglingReference { from: RecordKey, to: RecordKey },
}

/// A batch that would break a relational guarantee of the data model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("locked palette mutation: {palette}")]
    LockedPalette { palette: PaletteId },
    #[error("colorOrder/colors mismatch on palette {palette}")]
    OrderMismatch { palette: PaletteId },
    #[error("color history reorder on palette {palette}")]
    ColorHistoryReorder { palette: PaletteId },
    #[error("color history cannot be deleted: {palette}")]
    ColorHistoryRemoval { palette: PaletteId },
    #[error("record already exists: {key}")]
    DuplicateRecord { key: RecordKey },
    #[error("id reused after removal: {key}")]
    IdReuse { key: RecordKey },
    #[error("record not found: {key}")]
    MissingRecord { key: RecordKey },
}

impl InvariantViolation {
    /// Short name of the rule that failed
    pub fn rule(&self) -> &'static str {
        match self {
            InvariantViolation::LockedPalette { .. } => "locked palette mutation",
            InvariantViolation::OrderMismatch { .. } => "colorOrder/colors mismatch",
            InvariantViolation::ColorHistoryReorder { .. } => "color history reorder",
            InvariantViolation::ColorHistoryRemoval { .. } => "color history removal",
            InvariantViolation::DuplicateRecord { .. } => "duplicate record",
            InvariantViolation::IdReuse { .. } => "id reuse",
            InvariantViolation::MissingRecord { .. } => "missing record",
        }
    }
}

/// Why a batch was rejected by any store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaViolation),
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl UpdateError {
    /// The invariant that failed, if this was an invariant violation
    pub fn invariant(&self) -> Option<&InvariantViolation> {
        match self {
            UpdateError::Invariant(v) => Some(v),
            UpdateError::Schema(_) => None,
        }
    }
}

/// Durable writes kept failing past the retry budget; entries stay queued
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("persistence degraded after {attempts} attempts ({pending} records pending): {last_error}")]
pub struct PersistenceDegraded {
    pub attempts: u32,
    pub pending: usize,
    pub last_error: String,
}

/// Reason a remote refused an update or query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("authentication expired")]
    AuthExpired,
    #[error("conflict: {0}")]
    Conflict(String),
}

/// The remote refused a whole batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote rejected: {reason}")]
pub struct RemoteRejected {
    pub reason: RejectReason,
}

impl RemoteRejected {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self.reason, RejectReason::AuthExpired)
    }
}
