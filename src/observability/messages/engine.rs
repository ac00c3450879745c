// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the close lifecycle.
//!
//! This module contains message types for logging events related to:
//! * Run start and completion
//! * Group dispatch and completion
//! * Critical-failure aborts and phase transitions
//! * Collaborator hooks (status store, notifier)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Close run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use period_close::observability::messages::engine::CloseStarted;
///
/// let msg = CloseStarted {
///     period_id: "2026-09",
///     period_type: "monthly",
///     task_count: 8,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct CloseStarted<'a> {
    pub period_id: &'a str,
    pub period_type: &'a str,
    pub task_count: usize,
}

impl Display for CloseStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} close for period '{}' with {} tasks",
            self.period_type, self.period_id, self.task_count
        )
    }
}

impl StructuredLog for CloseStarted<'_> {
    fn log(&self) {
        tracing::info!(
            period_id = self.period_id,
            period_type = self.period_type,
            task_count = self.task_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "close",
            span_name = name,
            period_id = self.period_id,
            period_type = self.period_type,
        )
    }
}

/// A group of tasks is about to be dispatched.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GroupStarted<'a> {
    pub group_index: usize,
    pub group_count: usize,
    pub task_ids: &'a [&'a str],
}

impl Display for GroupStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatching group {}/{}: [{}]",
            self.group_index + 1,
            self.group_count,
            self.task_ids.join(", ")
        )
    }
}

impl StructuredLog for GroupStarted<'_> {
    fn log(&self) {
        tracing::info!(
            group_index = self.group_index,
            group_size = self.task_ids.len(),
            "{}", self
        );
    }
}

/// Every task in a group has produced a result.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GroupCompleted {
    pub group_index: usize,
    pub task_count: usize,
    pub failures: usize,
    pub duration: Duration,
}

impl Display for GroupCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Group {} completed: {} tasks, {} failed, in {:?}",
            self.group_index + 1,
            self.task_count,
            self.failures,
            self.duration
        )
    }
}

impl StructuredLog for GroupCompleted {
    fn log(&self) {
        tracing::info!(
            group_index = self.group_index,
            task_count = self.task_count,
            failures = self.failures,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A critical task failed; remaining groups will not run.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CriticalFailureAbort<'a> {
    pub group_index: usize,
    pub failed_tasks: &'a [&'a str],
    pub skipped_groups: usize,
}

impl Display for CriticalFailureAbort<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Critical task(s) [{}] failed in group {}; skipping {} remaining group(s)",
            self.failed_tasks.join(", "),
            self.group_index + 1,
            self.skipped_groups
        )
    }
}

impl StructuredLog for CriticalFailureAbort<'_> {
    fn log(&self) {
        tracing::error!(
            group_index = self.group_index,
            failed_tasks = self.failed_tasks.join(","),
            skipped_groups = self.skipped_groups,
            "{}", self
        );
    }
}

/// Orchestration phase transition.
///
/// # Log Level
/// `debug!` - Diagnostic
pub struct PhaseChanged<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

impl Display for PhaseChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Close phase {} -> {}", self.from, self.to)
    }
}

impl StructuredLog for PhaseChanged<'_> {
    fn log(&self) {
        tracing::debug!(from = self.from, to = self.to, "{}", self);
    }
}

/// Close run finished.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use period_close::observability::messages::engine::CloseCompleted;
/// use std::time::Duration;
///
/// let msg = CloseCompleted {
///     period_id: "2026-09",
///     status: "COMPLETED",
///     task_count: 8,
///     issue_count: 0,
///     duration: Duration::from_secs(42),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct CloseCompleted<'a> {
    pub period_id: &'a str,
    pub status: &'a str,
    pub task_count: usize,
    pub issue_count: usize,
    pub duration: Duration,
}

impl Display for CloseCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Close for period '{}' finished {}: {} task results, {} issues, in {:?}",
            self.period_id, self.status, self.task_count, self.issue_count, self.duration
        )
    }
}

impl StructuredLog for CloseCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            period_id = self.period_id,
            status = self.status,
            task_count = self.task_count,
            issue_count = self.issue_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Period status written through the status store.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PeriodStatusUpdated<'a> {
    pub period_id: &'a str,
    pub from: &'a str,
    pub to: &'a str,
}

impl Display for PeriodStatusUpdated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Period '{}' moved from {} to {}",
            self.period_id, self.from, self.to
        )
    }
}

impl StructuredLog for PeriodStatusUpdated<'_> {
    fn log(&self) {
        tracing::info!(
            period_id = self.period_id,
            from = self.from,
            to = self.to,
            "{}", self
        );
    }
}

/// The notification sink rejected the completion event.
///
/// # Log Level
/// `warn!` - Non-fatal
pub struct NotificationFailed<'a> {
    pub period_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for NotificationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to publish completion for period '{}': {}",
            self.period_id, self.error
        )
    }
}

impl StructuredLog for NotificationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            period_id = self.period_id,
            error = %self.error,
            "{}", self
        );
    }
}

/// Completion event handed to the log-backed notification sink.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CompletionPublished<'a> {
    pub period_id: &'a str,
    pub status: &'a str,
    pub task_count: usize,
    pub issue_count: usize,
}

impl Display for CompletionPublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Closing completed notification: period '{}' {} ({} tasks, {} issues)",
            self.period_id, self.status, self.task_count, self.issue_count
        )
    }
}

impl StructuredLog for CompletionPublished<'_> {
    fn log(&self) {
        tracing::info!(
            period_id = self.period_id,
            status = self.status,
            task_count = self.task_count,
            issue_count = self.issue_count,
            "{}", self
        );
    }
}
