// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::models::{ClosingIssue, ClosingPeriod, TaskResult};

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosingStatus {
    Completed,
    Partial,
    Failed,
}

impl ClosingStatus {
    /// COMPLETED with no failures, FAILED when failures reach half of the
    /// executed results, PARTIAL otherwise.
    pub fn from_counts(failures: usize, executed: usize) -> Self {
        if failures == 0 {
            ClosingStatus::Completed
        } else if failures * 2 >= executed {
            ClosingStatus::Failed
        } else {
            ClosingStatus::Partial
        }
    }
}

impl fmt::Display for ClosingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClosingStatus::Completed => "COMPLETED",
            ClosingStatus::Partial => "PARTIAL",
            ClosingStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_tasks: usize,
    pub successful_tasks: usize,
    pub failed_tasks: usize,
    pub warning_tasks: usize,
    pub skipped_tasks: usize,
    pub total_entries: u64,
    pub total_amount: f64,
    pub total_task_duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingReport {
    pub summary: ReportSummary,
    pub details: Vec<TaskResult>,
    pub issues: Vec<ClosingIssue>,
    pub recommendations: Vec<String>,
    pub approval_required: bool,
    pub approvers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub task_id: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_execution_time: Duration,
    /// Sum of per-task durations minus wall-clock time, floored at zero.
    pub parallel_tasks_saved: Duration,
    pub bottleneck_tasks: Vec<Bottleneck>,
    pub optimization_suggestions: Vec<String>,
}

/// Top-level output of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingResult {
    pub period: ClosingPeriod,
    pub status: ClosingStatus,
    pub task_results: Vec<TaskResult>,
    pub report: ClosingReport,
    pub performance: PerformanceMetrics,
    pub completed_at: DateTime<Utc>,
    pub total_duration: Duration,
}

impl ClosingResult {
    pub fn result_for(&self, task_id: &str) -> Option<&TaskResult> {
        self.task_results.iter().find(|r| r.task_id == task_id)
    }
}
