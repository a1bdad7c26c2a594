// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing support for operations and log entries

use crate::log::LogEntry;
use crate::operation::Operation;

/// Trait for values that should be traced
///
/// Provides consistent naming and structured fields for logging.
pub trait TracedOperation {
    /// Name for log spans (e.g., "add_record", "replace_relationship")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl TracedOperation for Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::AddRecord { .. } => "add_record",
            Operation::UpdateAttribute { .. } => "update_attribute",
            Operation::RemoveRecord { .. } => "remove_record",
            Operation::AddToRelationship { .. } => "add_to_relationship",
            Operation::RemoveFromRelationship { .. } => "remove_from_relationship",
            Operation::ReplaceRelationship { .. } => "replace_relationship",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("key", self.key().to_string())];
        match self {
            Operation::UpdateAttribute { new, .. } => {
                fields.push(("attribute", new.name().to_string()));
            }
            Operation::AddToRelationship { color, .. }
            | Operation::RemoveFromRelationship { color, .. } => {
                fields.push(("color", color.to_string()));
            }
            Operation::ReplaceRelationship { new, .. } => {
                fields.push(("count", new.len().to_string()));
            }
            Operation::AddRecord { .. } | Operation::RemoveRecord { .. } => {}
        }
        fields
    }
}

impl TracedOperation for LogEntry {
    fn name(&self) -> &'static str {
        self.operation.name()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("seq", self.seq.to_string()),
            ("transaction", self.transaction.to_string()),
            ("origin", format!("{:?}", self.origin).to_lowercase()),
        ];
        fields.extend(self.operation.fields());
        fields
    }
}

/// Render fields as `k=v` pairs separated by spaces
pub fn format_fields(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
