// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::time::Duration;

use crate::analysis::issue_types;
use crate::config::consts::DEFAULT_OVERRUN_TOLERANCE;
use crate::config::AnalysisConfig;
use crate::models::{
    ClosingIssue, ClosingPeriod, IssueSeverity, TaskDefinition, TaskResult, TaskStatus,
};

/// Fixed checks run over a close's results before the report is built.
///
/// | Check | Severity | Issue type |
/// |---|---|---|
/// | any task failed | HIGH | `TASK_FAILURES` |
/// | any task warned | LOW | `TASK_WARNINGS` |
/// | scheduled task has no result | MEDIUM | `INCOMPLETE_EXECUTION` |
/// | task ran past its estimate plus tolerance | LOW | `DURATION_OVERRUN` |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationStage {
    overrun_tolerance: f64,
}

impl Default for ValidationStage {
    fn default() -> Self {
        Self::new(DEFAULT_OVERRUN_TOLERANCE)
    }
}

impl ValidationStage {
    /// `overrun_tolerance` is the fraction over `estimated_duration` a task may
    /// run before it is flagged; 0.5 allows 50 %.
    pub fn new(overrun_tolerance: f64) -> Self {
        Self {
            overrun_tolerance: overrun_tolerance.max(0.0),
        }
    }

    pub fn from_config(cfg: &AnalysisConfig) -> Self {
        Self::new(cfg.overrun_tolerance())
    }

    pub fn validate(
        &self,
        period: &ClosingPeriod,
        tasks: &[TaskDefinition],
        results: &[TaskResult],
    ) -> Vec<ClosingIssue> {
        let mut issues = Vec::new();

        let failed = ids_with_status(results, TaskStatus::Failure);
        if !failed.is_empty() {
            issues.push(
                ClosingIssue::new(
                    IssueSeverity::High,
                    issue_types::TASK_FAILURES,
                    format!(
                        "{} task(s) failed while closing period '{}': {}",
                        failed.len(),
                        period.id,
                        failed.join(", ")
                    ),
                )
                .with_suggested_action("Review the task errors, fix the underlying data and re-run the close")
                .with_affected_tasks(failed),
            );
        }

        let warned = ids_with_status(results, TaskStatus::Warning);
        if !warned.is_empty() {
            issues.push(
                ClosingIssue::new(
                    IssueSeverity::Low,
                    issue_types::TASK_WARNINGS,
                    format!("{} task(s) completed with warnings: {}", warned.len(), warned.join(", ")),
                )
                .with_suggested_action("Review the warnings before hard close")
                .with_affected_tasks(warned),
            );
        }

        let seen: HashSet<&str> = results.iter().map(|r| r.task_id.as_str()).collect();
        let missing: Vec<String> = tasks
            .iter()
            .filter(|t| !seen.contains(t.id.as_str()))
            .map(|t| t.id.clone())
            .collect();
        if !missing.is_empty() {
            issues.push(
                ClosingIssue::new(
                    IssueSeverity::Medium,
                    issue_types::INCOMPLETE_EXECUTION,
                    format!(
                        "{} scheduled task(s) were never executed: {}",
                        missing.len(),
                        missing.join(", ")
                    ),
                )
                .with_suggested_action("Resolve the failures that stopped the run and re-run the close")
                .with_affected_tasks(missing),
            );
        }

        for task in tasks {
            if let Some(result) = results.iter().find(|r| r.task_id == task.id) {
                if let Some(issue) = self.check_overrun(task, result) {
                    issues.push(issue);
                }
            }
        }

        issues
    }

    fn check_overrun(&self, task: &TaskDefinition, result: &TaskResult) -> Option<ClosingIssue> {
        if task.estimated_duration.is_zero()
            || !matches!(result.status, TaskStatus::Success | TaskStatus::Warning)
        {
            return None;
        }

        let scaled = task.estimated_duration.as_secs_f64() * (1.0 + self.overrun_tolerance);
        let Ok(limit) = Duration::try_from_secs_f64(scaled) else {
            return None;
        };
        if result.duration <= limit {
            return None;
        }

        Some(
            ClosingIssue::new(
                IssueSeverity::Low,
                issue_types::DURATION_OVERRUN,
                format!(
                    "Task '{}' took {:.1}s against an estimate of {:.1}s",
                    task.id,
                    result.duration.as_secs_f64(),
                    task.estimated_duration.as_secs_f64()
                ),
            )
            .with_affected_tasks(vec![task.id.clone()]),
        )
    }
}

fn ids_with_status(results: &[TaskResult], status: TaskStatus) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.status == status)
        .map(|r| r.task_id.clone())
        .collect()
}
