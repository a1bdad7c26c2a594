// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Undo steps retained per palette
    pub undo_depth: usize,
    /// Backoff for durable writes
    pub persist_retry: RetryPolicy,
    /// Backoff for remote propagation
    pub remote_retry: RetryPolicy,
    /// Pull remote changes whenever the cache is queried
    pub pull_on_query: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undo_depth: 50,
            persist_retry: RetryPolicy::persistence(),
            remote_retry: RetryPolicy::remote(),
            pull_on_query: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_depth == 0 {
            return Err(ConfigError::Invalid("undo_depth must be at least 1".into()));
        }
        for (name, policy) in [
            ("persist_retry", &self.persist_retry),
            ("remote_retry", &self.remote_retry),
        ] {
            if !policy.multiplier.is_finite() || policy.multiplier < 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "{}.multiplier must be >= 1.0",
                    name
                )));
            }
            if policy.initial_delay > policy.max_delay {
                return Err(ConfigError::Invalid(format!(
                    "{}.initial_delay exceeds max_delay",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
