// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing error display with context and suggestions

use std::fmt;
use sw_core::InvariantViolation;
use sw_engine::RuntimeError;

#[derive(Debug, Clone)]
pub struct SwError {
    pub message: String,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl SwError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn palette_not_found(query: &str) -> Self {
        SwError::new(format!("no palette matches '{}'", query))
            .with_suggestion("List palettes: sw palette list")
    }

    pub fn ambiguous_palette(query: &str, matches: usize) -> Self {
        SwError::new(format!("'{}' matches {} palettes", query, matches))
            .with_suggestion("Use the palette id instead of its name")
    }

    /// Translate an engine failure into something a user can act on
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<SwError>() {
            return err.clone();
        }
        let Some(runtime) = err.downcast_ref::<RuntimeError>() else {
            return err
                .chain()
                .skip(1)
                .fold(SwError::new(err.to_string()), |e, cause| {
                    e.with_context(cause.to_string())
                });
        };
        let base = SwError::new(runtime.to_string());
        match runtime.invariant() {
            Some(InvariantViolation::LockedPalette { palette }) => base
                .with_context("the palette is locked against structural changes")
                .with_suggestion(format!("Unlock it first: sw palette unlock {}", palette)),
            Some(InvariantViolation::ColorHistoryReorder { .. }) => {
                base.with_context("the color history keeps newest colors first")
            }
            Some(InvariantViolation::MissingRecord { key }) => base
                .with_context(format!("{} does not exist", key))
                .with_suggestion("List palettes: sw palette list"),
            Some(violation) => base.with_context(format!("rule: {}", violation.rule())),
            None => base,
        }
    }
}

impl fmt::Display for SwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for SwError {}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_core::{PaletteId, UpdateError};

    #[test]
    fn display_lists_context_and_suggestions() {
        let err = SwError::new("Something went wrong")
            .with_context("First context")
            .with_suggestion("Try this")
            .with_suggestion("Or this");

        let output = format!("{}", err);
        assert!(output.contains("error: Something went wrong"));
        assert!(output.contains("-> First context"));
        assert!(output.contains("1. Try this"));
        assert!(output.contains("2. Or this"));
    }

    #[test]
    fn locked_palette_suggests_unlock() {
        let runtime = RuntimeError::Update(UpdateError::from(InvariantViolation::LockedPalette {
            palette: PaletteId::from("p1"),
        }));
        let err = SwError::from_anyhow(&anyhow::Error::new(runtime));
        let output = err.to_string();
        assert!(output.contains("locked palette mutation"));
        assert!(output.contains("sw palette unlock p1"));
    }

    #[test]
    fn plain_errors_keep_their_causes() {
        let err = anyhow::anyhow!("disk full").context("writing palette");
        let output = SwError::from_anyhow(&err).to_string();
        assert!(output.contains("error: writing palette"));
        assert!(output.contains("-> disk full"));
    }
}
