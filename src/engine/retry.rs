// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::{DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS};
use crate::config::RetryConfig;
use crate::traits::WorkOutput;

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(WorkOutput),
    Failure { error: String },
    /// The deadline passed before the work finished.
    TimedOut { after: Duration },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }

    /// Human-readable failure reason, `None` on success.
    pub fn error_message(&self) -> Option<String> {
        match self {
            AttemptOutcome::Success(_) => None,
            AttemptOutcome::Failure { error } => Some(error.clone()),
            AttemptOutcome::TimedOut { after } => {
                Some(format!("Task timed out after {}s", after.as_secs_f64()))
            }
        }
    }
}

/// What the executor should do after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The attempt succeeded.
    Finish,
    /// Sleep, then run another attempt.
    RetryAfter(Duration),
    /// Out of attempts; report the failure.
    GiveUp,
}

/// Exponential backoff with a cap.
///
/// After the n-th failed attempt (one-based) the executor sleeps
/// `base_delay * multiplier^n`, never more than `max_delay`. The defaults give
/// 2s, 4s, 8s, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, multiplier: u32, max_delay: Duration) -> Self {
        Self {
            base_delay,
            multiplier: multiplier.max(1),
            max_delay,
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(cfg.base_delay(), cfg.multiplier(), cfg.max_delay())
    }

    /// Retries back-to-back. Mostly useful in tests.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, 1, Duration::ZERO)
    }

    /// Sleep after `failed_attempts` consecutive failures.
    pub fn backoff_after(&self, failed_attempts: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(failed_attempts)
            .unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Decide the next step after zero-based attempt `attempt` of a task
    /// allowed `retry_count` retries.
    pub fn decide(&self, attempt: u32, retry_count: u32, outcome: &AttemptOutcome) -> RetryDecision {
        if outcome.is_success() {
            RetryDecision::Finish
        } else if attempt < retry_count {
            RetryDecision::RetryAfter(self.backoff_after(attempt + 1))
        } else {
            RetryDecision::GiveUp
        }
    }
}
