// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::models::{TaskDefinition, TaskType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Success,
    Failure,
    Warning,
    Skipped,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
            TaskStatus::Warning => "WARNING",
            TaskStatus::Skipped => "SKIPPED",
        };
        f.write_str(name)
    }
}

/// Final outcome of one task in one run, after all retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: Duration,
    pub entries_created: Option<u64>,
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Number of executions made, including the first.
    pub attempts: u32,
}

impl TaskResult {
    /// A terminal failure carrying the last error seen.
    pub fn failed(
        task: &TaskDefinition,
        start_time: DateTime<Utc>,
        duration: Duration,
        error: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            task_id: task.id.clone(),
            task_type: task.task_type,
            status: TaskStatus::Failure,
            start_time,
            end_time: Utc::now(),
            duration,
            entries_created: None,
            total_amount: None,
            errors: vec![error.into()],
            warnings: Vec::new(),
            metadata: HashMap::new(),
            attempts,
        }
    }

    /// A task that was never executed.
    pub fn skipped(task: &TaskDefinition, reason: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id: task.id.clone(),
            task_type: task.task_type,
            status: TaskStatus::Skipped,
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            entries_created: None,
            total_amount: None,
            errors: Vec::new(),
            warnings: vec![reason.into()],
            metadata: HashMap::new(),
            attempts: 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == TaskStatus::Failure
    }

    pub fn is_warning(&self) -> bool {
        self.status == TaskStatus::Warning
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueSeverity::Low => "LOW",
            IssueSeverity::Medium => "MEDIUM",
            IssueSeverity::High => "HIGH",
        };
        f.write_str(name)
    }
}

/// Something a reviewer has to look at before the period can be hard-closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingIssue {
    pub severity: IssueSeverity,
    pub issue_type: String,
    pub description: String,
    pub suggested_action: Option<String>,
    #[serde(default)]
    pub affected_accounts: Vec<String>,
    #[serde(default)]
    pub affected_tasks: Vec<String>,
}

impl ClosingIssue {
    pub fn new(
        severity: IssueSeverity,
        issue_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            issue_type: issue_type.into(),
            description: description.into(),
            suggested_action: None,
            affected_accounts: Vec::new(),
            affected_tasks: Vec::new(),
        }
    }

    pub fn with_suggested_action(mut self, action: impl Into<String>) -> Self {
        self.suggested_action = Some(action.into());
        self
    }

    pub fn with_affected_tasks(mut self, tasks: Vec<String>) -> Self {
        self.affected_tasks = tasks;
        self
    }

    pub fn is_high(&self) -> bool {
        self.severity == IssueSeverity::High
    }
}
