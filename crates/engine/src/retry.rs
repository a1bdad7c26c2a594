// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy with exponential backoff
//!
//! Each propagation target keeps a [`RetryState`]. After every failure the
//! state tells the worker how long to wait, and whether the failure should be
//! surfaced as degraded or the batch abandoned.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Delay after the first failure
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Consecutive failures before the target is reported degraded
    pub degrade_after: u32,
    /// Consecutive failures before a batch is abandoned (`None` retries forever)
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            degrade_after: 3,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Durable writes are never abandoned
    pub fn persistence() -> Self {
        Self {
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
            ..Self::default()
        }
    }

    /// Remote batches back off on every failure; after `max_attempts` a
    /// rejected transaction is abandoned and a network outage pauses until
    /// the next change
    pub fn remote() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_attempts: Some(5),
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

/// What to do after a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    /// Wait, then retry
    Retry { delay: Duration },
    /// Wait, then retry; the target should be reported degraded
    Degraded { delay: Duration },
    /// Stop retrying this batch
    GiveUp,
}

/// Consecutive-failure tracking for one target
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl RetryState {
    /// Record a failure and decide the next step
    pub fn record_failure(&mut self, policy: &RetryPolicy, error: impl Into<String>) -> RetryAction {
        self.attempts += 1;
        self.last_error = Some(error.into());

        if let Some(max) = policy.max_attempts {
            if self.attempts >= max {
                return RetryAction::GiveUp;
            }
        }

        let delay = policy.delay_for(self.attempts);
        if self.attempts >= policy.degrade_after {
            RetryAction::Degraded { delay }
        } else {
            RetryAction::Retry { delay }
        }
    }

    /// Record a success, clearing the failure streak
    pub fn record_success(&mut self) {
        self.attempts = 0;
        self.last_error = None;
    }

    pub fn is_failing(&self) -> bool {
        self.attempts > 0
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
