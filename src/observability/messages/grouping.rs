// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dependency grouping and catalog structure.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Grouping finished (possibly partially).
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use period_close::observability::messages::grouping::GroupsComputed;
///
/// let msg = GroupsComputed {
///     group_count: 4,
///     placed: 8,
///     total: 8,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct GroupsComputed {
    pub group_count: usize,
    pub placed: usize,
    pub total: usize,
}

impl Display for GroupsComputed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Computed {} groups placing {}/{} tasks",
            self.group_count, self.placed, self.total
        )
    }
}

impl StructuredLog for GroupsComputed {
    fn log(&self) {
        tracing::info!(
            group_count = self.group_count,
            placed = self.placed,
            total = self.total,
            "{}", self
        );
    }
}

/// Grouping stalled with tasks still unplaced.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CircularDependencyDetected<'a> {
    pub unplaced: &'a [&'a str],
    pub cycle: Option<&'a [String]>,
}

impl Display for CircularDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Circular or unresolvable dependencies: could not place [{}]",
            self.unplaced.join(", ")
        )?;
        if let Some(cycle) = self.cycle {
            write!(f, " (cycle: {})", cycle.join(" -> "))?;
        }
        Ok(())
    }
}

impl StructuredLog for CircularDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            unplaced = self.unplaced.join(","),
            unplaced_count = self.unplaced.len(),
            cycle = self.cycle.map(|c| c.join(" -> ")).unwrap_or_default(),
            "{}", self
        );
    }
}

/// A task depends on an id that isn't scheduled in this run.
///
/// # Log Level
/// `warn!`
pub struct UnresolvedDependency<'a> {
    pub task_id: &'a str,
    pub missing_dependency: &'a str,
}

impl Display for UnresolvedDependency<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' depends on '{}' which is not scheduled",
            self.task_id, self.missing_dependency
        )
    }
}

impl StructuredLog for UnresolvedDependency<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = self.task_id,
            missing_dependency = self.missing_dependency,
            "{}", self
        );
    }
}
