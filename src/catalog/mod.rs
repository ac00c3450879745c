// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The table of closing tasks and which period types schedule them.
//!
//! Building a run's task list is a pure function of the period type: filter
//! [`CATALOG`] by applicability, apply any configured overrides, then append
//! the synthetic `final-validation` task that depends on everything else.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::TaskOverride;
use crate::models::{ClosingPeriod, PeriodType, TaskDefinition, TaskType};

pub const FINAL_VALIDATION_ID: &str = "final-validation";

/// Which period types schedule a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// Every period, including daily.
    Always,
    /// Monthly, quarterly and yearly.
    PeriodEnd,
    /// Quarterly and yearly.
    QuarterEnd,
    /// Yearly only.
    YearEnd,
}

impl Applicability {
    pub fn applies_to(&self, period_type: PeriodType) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::PeriodEnd => period_type.is_period_end(),
            Applicability::QuarterEnd => {
                matches!(period_type, PeriodType::Quarterly | PeriodType::Yearly)
            }
            Applicability::YearEnd => period_type == PeriodType::Yearly,
        }
    }
}

/// One row of the catalog table.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub task_type: TaskType,
    pub applies: Applicability,
    pub sequence: u32,
    pub dependencies: &'static [&'static str],
    pub is_parallel: bool,
    pub is_critical: bool,
    pub estimated_secs: u64,
    pub timeout_secs: u64,
    pub retry_count: u32,
}

impl CatalogEntry {
    fn to_definition(self, active: &[&str]) -> TaskDefinition {
        TaskDefinition {
            id: self.id.to_string(),
            task_type: self.task_type,
            sequence: self.sequence,
            // A dependency on a row the period doesn't schedule is dropped.
            dependencies: self
                .dependencies
                .iter()
                .filter(|d| active.contains(d))
                .map(|d| d.to_string())
                .collect(),
            is_parallel: self.is_parallel,
            is_critical: self.is_critical,
            estimated_duration: Duration::from_secs(self.estimated_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            retry_count: self.retry_count,
        }
    }
}

/// Closing tasks, in sequence order.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "bank-reconciliation",
        task_type: TaskType::Reconciliation,
        applies: Applicability::Always,
        sequence: 10,
        dependencies: &[],
        is_parallel: true,
        is_critical: false,
        estimated_secs: 120,
        timeout_secs: 300,
        retry_count: 2,
    },
    CatalogEntry {
        id: "accruals",
        task_type: TaskType::Accruals,
        applies: Applicability::Always,
        sequence: 20,
        dependencies: &[],
        is_parallel: true,
        is_critical: true,
        estimated_secs: 60,
        timeout_secs: 300,
        retry_count: 3,
    },
    CatalogEntry {
        id: "depreciation",
        task_type: TaskType::Depreciation,
        applies: Applicability::Always,
        sequence: 30,
        dependencies: &[],
        is_parallel: true,
        is_critical: true,
        estimated_secs: 45,
        timeout_secs: 300,
        retry_count: 3,
    },
    CatalogEntry {
        id: "provisions",
        task_type: TaskType::Provisions,
        applies: Applicability::Always,
        sequence: 40,
        dependencies: &["accruals"],
        is_parallel: true,
        is_critical: false,
        estimated_secs: 30,
        timeout_secs: 180,
        retry_count: 2,
    },
    CatalogEntry {
        id: "intercompany-elimination",
        task_type: TaskType::Intercompany,
        applies: Applicability::PeriodEnd,
        sequence: 50,
        dependencies: &["accruals"],
        is_parallel: true,
        is_critical: true,
        estimated_secs: 90,
        timeout_secs: 600,
        retry_count: 2,
    },
    CatalogEntry {
        id: "fx-revaluation",
        task_type: TaskType::ForeignExchange,
        applies: Applicability::PeriodEnd,
        sequence: 60,
        dependencies: &[],
        is_parallel: true,
        is_critical: false,
        estimated_secs: 30,
        timeout_secs: 120,
        retry_count: 3,
    },
    CatalogEntry {
        id: "cost-allocations",
        task_type: TaskType::Allocations,
        applies: Applicability::QuarterEnd,
        sequence: 65,
        dependencies: &["accruals", "depreciation"],
        is_parallel: true,
        is_critical: false,
        estimated_secs: 60,
        timeout_secs: 300,
        retry_count: 2,
    },
    CatalogEntry {
        id: "tax-calculation",
        task_type: TaskType::TaxCalculation,
        applies: Applicability::PeriodEnd,
        sequence: 70,
        dependencies: &["accruals", "depreciation", "provisions", "fx-revaluation"],
        is_parallel: false,
        is_critical: true,
        estimated_secs: 120,
        timeout_secs: 600,
        retry_count: 2,
    },
    CatalogEntry {
        id: "consolidation",
        task_type: TaskType::Consolidation,
        applies: Applicability::YearEnd,
        sequence: 80,
        dependencies: &["intercompany-elimination", "tax-calculation", "cost-allocations"],
        is_parallel: false,
        is_critical: true,
        estimated_secs: 300,
        timeout_secs: 1800,
        retry_count: 1,
    },
    CatalogEntry {
        id: "statutory-reporting",
        task_type: TaskType::Reporting,
        applies: Applicability::YearEnd,
        sequence: 90,
        dependencies: &["consolidation"],
        is_parallel: true,
        is_critical: false,
        estimated_secs: 180,
        timeout_secs: 900,
        retry_count: 1,
    },
];

/// Settings of the synthetic final task.
const FINAL_VALIDATION_SEQUENCE: u32 = 1_000;
const FINAL_VALIDATION_ESTIMATE: Duration = Duration::from_secs(30);
const FINAL_VALIDATION_TIMEOUT: Duration = Duration::from_secs(300);
const FINAL_VALIDATION_RETRIES: u32 = 1;

/// Produces the ordered task list for a period.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    overrides: HashMap<TaskType, TaskOverride>,
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog whose rows are adjusted by per-type overrides.
    pub fn with_overrides(overrides: HashMap<TaskType, TaskOverride>) -> Self {
        Self { overrides }
    }

    /// Task definitions for `period`, ordered by sequence, ending with
    /// `final-validation`.
    pub fn build_tasks(&self, period: &ClosingPeriod) -> Vec<TaskDefinition> {
        let active: Vec<&str> = CATALOG
            .iter()
            .filter(|e| e.applies.applies_to(period.period_type))
            .map(|e| e.id)
            .collect();

        let mut tasks: Vec<TaskDefinition> = CATALOG
            .iter()
            .filter(|e| e.applies.applies_to(period.period_type))
            .map(|e| self.apply_override(e.to_definition(&active)))
            .collect();

        let final_validation = self.apply_override(TaskDefinition {
            id: FINAL_VALIDATION_ID.to_string(),
            task_type: TaskType::Validation,
            sequence: FINAL_VALIDATION_SEQUENCE,
            dependencies: tasks.iter().map(|t| t.id.clone()).collect(),
            is_parallel: false,
            is_critical: true,
            estimated_duration: FINAL_VALIDATION_ESTIMATE,
            timeout: FINAL_VALIDATION_TIMEOUT,
            retry_count: FINAL_VALIDATION_RETRIES,
        });
        tasks.push(final_validation);
        tasks
    }

    fn apply_override(&self, mut task: TaskDefinition) -> TaskDefinition {
        let Some(o) = self.overrides.get(&task.task_type) else {
            return task;
        };
        if let Some(secs) = o.timeout_seconds {
            task.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = o.retry_count {
            task.retry_count = retries;
        }
        if let Some(secs) = o.estimated_seconds {
            task.estimated_duration = Duration::from_secs(secs);
        }
        // final-validation stays critical whatever the config says
        if let Some(critical) = o.critical {
            if task.id != FINAL_VALIDATION_ID {
                task.is_critical = critical;
            }
        }
        task
    }
}
