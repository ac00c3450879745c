// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The closed set of closing task kinds. Each kind maps to exactly one
/// registered work function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Accruals,
    Depreciation,
    Provisions,
    Intercompany,
    ForeignExchange,
    TaxCalculation,
    Reconciliation,
    Allocations,
    Consolidation,
    Reporting,
    Validation,
}

impl TaskType {
    pub const ALL: [TaskType; 11] = [
        TaskType::Accruals,
        TaskType::Depreciation,
        TaskType::Provisions,
        TaskType::Intercompany,
        TaskType::ForeignExchange,
        TaskType::TaxCalculation,
        TaskType::Reconciliation,
        TaskType::Allocations,
        TaskType::Consolidation,
        TaskType::Reporting,
        TaskType::Validation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Accruals => "ACCRUALS",
            TaskType::Depreciation => "DEPRECIATION",
            TaskType::Provisions => "PROVISIONS",
            TaskType::Intercompany => "INTERCOMPANY",
            TaskType::ForeignExchange => "FOREIGN_EXCHANGE",
            TaskType::TaxCalculation => "TAX_CALCULATION",
            TaskType::Reconciliation => "RECONCILIATION",
            TaskType::Allocations => "ALLOCATIONS",
            TaskType::Consolidation => "CONSOLIDATION",
            TaskType::Reporting => "REPORTING",
            TaskType::Validation => "VALIDATION",
        }
    }

    /// Parse the wire name, accepting either case and `-` in place of `_`.
    pub fn parse(name: &str) -> Option<TaskType> {
        let normalized = name.trim().to_ascii_uppercase().replace('-', "_");
        TaskType::ALL.into_iter().find(|t| t.as_str() == normalized)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable descriptor of one closing task within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Unique within a run.
    pub id: String,
    pub task_type: TaskType,
    /// Tie-break ordinal used by the grouper.
    pub sequence: u32,
    /// Ids of tasks that must have completed first.
    pub dependencies: Vec<String>,
    /// May share a group with other parallel tasks.
    pub is_parallel: bool,
    /// A failure aborts every later group.
    pub is_critical: bool,
    pub estimated_duration: Duration,
    pub timeout: Duration,
    /// Additional attempts after the first one.
    pub retry_count: u32,
}

impl TaskDefinition {
    pub fn depends_on(&self, task_id: &str) -> bool {
        self.dependencies.iter().any(|d| d == task_id)
    }

    /// Total number of executions the executor may make.
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }
}

/// Tasks that can be dispatched together. Derived by the grouper, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskGroup(pub Vec<TaskDefinition>);

impl TaskGroup {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, task: TaskDefinition) {
        self.0.push(task);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.0.iter()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.0.iter().any(|t| t.id == task_id)
    }

    pub fn task_ids(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.id.as_str()).collect()
    }
}

impl From<Vec<TaskDefinition>> for TaskGroup {
    fn from(tasks: Vec<TaskDefinition>) -> Self {
        Self(tasks)
    }
}

impl From<TaskGroup> for Vec<TaskDefinition> {
    fn from(group: TaskGroup) -> Self {
        group.0
    }
}
