// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime

use sw_adapters::RemoteError;
use sw_core::UpdateError;
use sw_storage::StorageError;
use thiserror::Error;

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("runtime is not activated")]
    NotActivated,
    #[error("no authenticated session")]
    NotAuthenticated,
    #[error("remote store is not ready; call activate() after login")]
    RemoteNotReady,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RuntimeError {
    /// The invariant a rejected batch broke, if any
    pub fn invariant(&self) -> Option<&sw_core::InvariantViolation> {
        match self {
            RuntimeError::Update(e) => e.invariant(),
            _ => None,
        }
    }
}

/// Outcome of an undo or redo request that changed nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("checkpoint restore rejected: {0}")]
    Rejected(#[from] UpdateError),
}
