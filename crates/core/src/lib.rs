// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sw-core: record model for the swatches sync engine
//!
//! This crate provides:
//! - Typed Color and Palette records with schema validation
//! - Operations with inverses, and the operation log they are appended to
//! - Materialized state and the query expressions evaluated against it
//! - The error taxonomy shared by every store

pub mod clock;
pub mod id;

pub mod color;
pub mod error;
pub mod log;
pub mod operation;
pub mod palette;
pub mod query;
pub mod record;
pub mod state;
pub mod traced;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use color::{Color, Rgba};
pub use error::{
    InvariantViolation, PersistenceDegraded, RejectReason, RemoteRejected, SchemaViolation,
    UpdateError,
};
pub use id::{ColorId, IdGen, PaletteId, SequentialIdGen, UuidIdGen};
pub use log::{LogEntry, OperationLog, Origin, Watermark};
pub use operation::Operation;
pub use palette::Palette;
pub use query::{Query, QueryResult, RECENT_COLORS};
pub use record::{Attribute, AttributeName, Record, RecordKey, RecordKind};
pub use state::MaterializedState;
pub use traced::TracedOperation;
