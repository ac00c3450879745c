// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::WorkError;
use crate::models::{ClosingPeriod, TaskDefinition, TaskType};
use crate::traits::{TaskWork, WorkContext, WorkOutput, WorkRegistry};

/// Largest accepted multiplier on estimated durations.
pub const MAX_TIME_SCALE: f64 = 1_000.0;

/// Deterministic stand-in for a task type's real work.
///
/// Entry counts and amounts scale with the number of days in the period. The
/// simulated delay is the task's estimated duration multiplied by
/// `time_scale`; a scale of `0.0` returns immediately. The scale is clamped to
/// `[0, MAX_TIME_SCALE]`.
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    task_type: TaskType,
    time_scale: f64,
    fail: bool,
}

impl SimulatedWork {
    pub fn new(task_type: TaskType, time_scale: f64) -> Self {
        Self {
            task_type,
            time_scale: if time_scale.is_nan() {
                0.0
            } else {
                time_scale.clamp(0.0, MAX_TIME_SCALE)
            },
            fail: false,
        }
    }

    /// Every attempt returns an error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// A registry covering every task type, with `failing` types set to fail.
    pub fn registry(failing: &[TaskType], time_scale: f64) -> WorkRegistry {
        TaskType::ALL
            .iter()
            .fold(WorkRegistry::new(), |registry, &task_type| {
                let mut work = SimulatedWork::new(task_type, time_scale);
                if failing.contains(&task_type) {
                    work = work.failing();
                }
                registry.with(task_type, Arc::new(work))
            })
    }

    fn output(&self, period: &ClosingPeriod, ctx: &WorkContext) -> WorkOutput {
        let days = period.day_count().max(1) as u64;
        let (entries_per_day, amount_per_entry) = match self.task_type {
            TaskType::Accruals => (4, 1_250.0),
            TaskType::Depreciation => (1, 3_400.0),
            TaskType::Provisions => (1, 800.0),
            TaskType::Intercompany => (2, 5_000.0),
            TaskType::ForeignExchange => (1, 420.5),
            TaskType::TaxCalculation => (1, 9_100.0),
            TaskType::Allocations => (3, 610.0),
            TaskType::Consolidation => (1, 25_000.0),
            TaskType::Reconciliation
            | TaskType::Reporting
            | TaskType::Validation => (0, 0.0),
        };

        let entries = entries_per_day * days;
        let output = WorkOutput::success()
            .with_entries(entries, entries as f64 * amount_per_entry)
            .with_metadata("simulated", serde_json::Value::Bool(true))
            .with_metadata("period_days", serde_json::json!(days))
            .with_metadata(
                "deadline_remaining_ms",
                serde_json::json!(ctx.remaining().as_millis() as u64),
            );

        // statements older than a month rarely match cleanly
        if self.task_type == TaskType::Reconciliation && days > 31 {
            output.with_warning(format!(
                "{} unmatched statement lines carried forward",
                days / 31
            ))
        } else {
            output
        }
    }
}

#[async_trait]
impl TaskWork for SimulatedWork {
    async fn execute(
        &self,
        task: &TaskDefinition,
        period: &ClosingPeriod,
        ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        let delay = task.estimated_duration.mul_f64(self.time_scale);
        if delay > Duration::ZERO {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.cancellation.cancelled() => return Err(WorkError::Cancelled),
            }
        }

        if self.fail {
            return Err(WorkError::failed(format!(
                "simulated failure in {} for period '{}'",
                task.id, period.id
            )));
        }

        Ok(self.output(period, ctx))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
