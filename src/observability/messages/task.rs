// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for individual task execution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Task handed to the executor.
///
/// # Log Level
/// `debug!` - Diagnostic
pub struct TaskDispatched<'a> {
    pub task_id: &'a str,
    pub task_type: &'a str,
    pub max_attempts: u32,
}

impl Display for TaskDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' ({}) dispatched with up to {} attempt(s)",
            self.task_id, self.task_type, self.max_attempts
        )
    }
}

impl StructuredLog for TaskDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            task_id = self.task_id,
            task_type = self.task_type,
            max_attempts = self.max_attempts,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task",
            span_name = name,
            task_id = self.task_id,
            task_type = self.task_type,
        )
    }
}

/// One attempt returned an error.
///
/// # Log Level
/// `warn!` - Recoverable until attempts run out
///
/// # Example
/// ```
/// use period_close::observability::messages::task::TaskAttemptFailed;
///
/// let msg = TaskAttemptFailed {
///     task_id: "fx-revaluation",
///     attempt: 1,
///     max_attempts: 3,
///     error: "rate feed unavailable",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct TaskAttemptFailed<'a> {
    /// One-based.
    pub attempt: u32,
    pub task_id: &'a str,
    pub max_attempts: u32,
    pub error: &'a str,
}

impl Display for TaskAttemptFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' attempt {}/{} failed: {}",
            self.task_id, self.attempt, self.max_attempts, self.error
        )
    }
}

impl StructuredLog for TaskAttemptFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = self.task_id,
            attempt = self.attempt,
            max_attempts = self.max_attempts,
            error = self.error,
            "{}", self
        );
    }
}

/// One attempt ran past its deadline.
///
/// # Log Level
/// `warn!` - Recoverable until attempts run out
pub struct TaskTimedOut<'a> {
    pub task_id: &'a str,
    pub attempt: u32,
    pub timeout: Duration,
}

impl Display for TaskTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' attempt {} timed out after {:?}; cancellation signalled",
            self.task_id, self.attempt, self.timeout
        )
    }
}

impl StructuredLog for TaskTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = self.task_id,
            attempt = self.attempt,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// Backoff before the next attempt.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TaskRetryScheduled<'a> {
    pub task_id: &'a str,
    /// One-based number of the attempt about to run.
    pub next_attempt: u32,
    pub delay: Duration,
}

impl Display for TaskRetryScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrying task '{}' (attempt {}) in {:?}",
            self.task_id, self.next_attempt, self.delay
        )
    }
}

impl StructuredLog for TaskRetryScheduled<'_> {
    fn log(&self) {
        tracing::info!(
            task_id = self.task_id,
            next_attempt = self.next_attempt,
            delay_ms = self.delay.as_millis() as u64,
            "{}", self
        );
    }
}

/// Task finished with a final result.
///
/// # Log Level
/// `info!` on success/warning, `error!` on failure
pub struct TaskFinished<'a> {
    pub task_id: &'a str,
    pub status: &'a str,
    pub attempts: u32,
    pub duration: Duration,
    pub failed: bool,
}

impl Display for TaskFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' finished {} after {} attempt(s) in {:?}",
            self.task_id, self.status, self.attempts, self.duration
        )
    }
}

impl StructuredLog for TaskFinished<'_> {
    fn log(&self) {
        if self.failed {
            tracing::error!(
                task_id = self.task_id,
                status = self.status,
                attempts = self.attempts,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::info!(
                task_id = self.task_id,
                status = self.status,
                attempts = self.attempts,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }
}

/// The in-flight registry refused a second dispatch of the same id.
///
/// # Log Level
/// `warn!`
pub struct DuplicateDispatchRejected<'a> {
    pub task_id: &'a str,
}

impl Display for DuplicateDispatchRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' was already dispatched in this run; refusing to run it again",
            self.task_id
        )
    }
}

impl StructuredLog for DuplicateDispatchRejected<'_> {
    fn log(&self) {
        tracing::warn!(task_id = self.task_id, "{}", self);
    }
}

/// The spawned task panicked or was aborted before producing a result.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TaskJoinFailed<'a> {
    pub task_id: &'a str,
    pub error: &'a str,
}

impl Display for TaskJoinFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task '{}' did not complete: {}", self.task_id, self.error)
    }
}

impl StructuredLog for TaskJoinFailed<'_> {
    fn log(&self) {
        tracing::error!(task_id = self.task_id, error = self.error, "{}", self);
    }
}
