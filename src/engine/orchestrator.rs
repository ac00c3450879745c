// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Group-sequenced execution of a period close.
//!
//! ## Phases
//!
//! ```text
//! RunningGroups ──(critical failure)──> AbortedEarly ─┐
//!       │                                             ├─> Validating ─> Done
//!       └─────────────────────────────────────────────┘
//! ```
//!
//! Groups run strictly one after another. Inside a group every task is spawned
//! onto the runtime and the group completes when all of them have produced a
//! result. Concurrency inside a group is bounded by a semaphore.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::Instrument;

use crate::analysis::{issue_types, PerformanceAnalyzer, ReportBuilder, ValidationStage};
use crate::catalog::TaskCatalog;
use crate::config::{validate_task_definitions, Config};
use crate::engine::executor::TaskExecutor;
use crate::engine::grouper::{DependencyGrouper, Grouping};
use crate::engine::registry::InFlightRegistry;
use crate::engine::retry::RetryPolicy;
use crate::errors::{EngineError, ValidationError};
use crate::models::{
    ClosingIssue, ClosingPeriod, ClosingResult, ClosingStatus, IssueSeverity, PeriodStatus,
    TaskDefinition, TaskGroup, TaskResult, TaskStatus,
};
use crate::observability::messages::engine::{
    CloseCompleted, CloseStarted, CriticalFailureAbort, GroupCompleted, GroupStarted,
    NotificationFailed, PeriodStatusUpdated, PhaseChanged,
};
use crate::observability::messages::task::{DuplicateDispatchRejected, TaskDispatched, TaskJoinFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::{ClosingCompleted, ClosingNotifier, PeriodStatusStore, WorkRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePhase {
    RunningGroups,
    AbortedEarly,
    Validating,
    Done,
}

impl ClosePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosePhase::RunningGroups => "running-groups",
            ClosePhase::AbortedEarly => "aborted-early",
            ClosePhase::Validating => "validating",
            ClosePhase::Done => "done",
        }
    }
}

/// Outcome of running the groups, before validation.
struct GroupRun {
    results: Vec<TaskResult>,
    issues: Vec<ClosingIssue>,
    phase: ClosePhase,
}

enum Dispatch<'a> {
    Spawned(&'a TaskDefinition, JoinHandle<TaskResult>),
    Refused(TaskResult),
}

/// Runs a period close end to end.
///
/// Task-level problems (failures, timeouts, critical aborts, unschedulable
/// tasks) end up in the returned [`ClosingResult`]. Only infrastructure faults
/// come back as [`EngineError`].
pub struct ClosingEngine {
    catalog: TaskCatalog,
    grouper: DependencyGrouper,
    work: WorkRegistry,
    executor: TaskExecutor,
    max_concurrency: Option<usize>,
    status_store: Arc<dyn PeriodStatusStore>,
    notifier: Arc<dyn ClosingNotifier>,
    validation: ValidationStage,
    reports: ReportBuilder,
    performance: PerformanceAnalyzer,
}

impl ClosingEngine {
    /// Engine with default catalog, retry policy and analysis thresholds.
    pub fn new(
        work: WorkRegistry,
        status_store: Arc<dyn PeriodStatusStore>,
        notifier: Arc<dyn ClosingNotifier>,
    ) -> Self {
        Self::from_config(&Config::default(), work, status_store, notifier)
    }

    pub fn from_config(
        cfg: &Config,
        work: WorkRegistry,
        status_store: Arc<dyn PeriodStatusStore>,
        notifier: Arc<dyn ClosingNotifier>,
    ) -> Self {
        Self {
            catalog: TaskCatalog::with_overrides(cfg.resolved_overrides()),
            grouper: DependencyGrouper::new(),
            work,
            executor: TaskExecutor::new(RetryPolicy::from_config(&cfg.retry)),
            max_concurrency: cfg.executor_options.max_concurrency().map(|n| n.max(1)),
            status_store,
            notifier,
            validation: ValidationStage::from_config(&cfg.analysis),
            reports: ReportBuilder::new(cfg.approvers()),
            performance: PerformanceAnalyzer::from_config(&cfg.analysis),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.executor = TaskExecutor::new(policy);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency.max(1));
        self
    }

    pub fn with_catalog(mut self, catalog: TaskCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Close `period` using the catalog's task set for its period type.
    ///
    /// On a COMPLETED run an open period is moved to soft-close through the
    /// status store and `period.status` is updated to match. Periods in any
    /// other status are left as they are.
    pub async fn perform_continuous_close(
        &self,
        period: &mut ClosingPeriod,
    ) -> Result<ClosingResult, EngineError> {
        let tasks = self.catalog.build_tasks(period);
        self.close_with_tasks(period, tasks).await
    }

    /// Close `period` with an explicit task set instead of the catalog's.
    pub async fn close_with_tasks(
        &self,
        period: &mut ClosingPeriod,
        tasks: Vec<TaskDefinition>,
    ) -> Result<ClosingResult, EngineError> {
        self.preflight(&tasks)?;

        let period_type = period.period_type.to_string();
        let started = CloseStarted {
            period_id: &period.id,
            period_type: &period_type,
            task_count: tasks.len(),
        };
        started.log();
        let span = started.span("perform_continuous_close");

        self.run(period, tasks).instrument(span).await
    }

    /// Reject task sets the engine cannot run at all.
    fn preflight(&self, tasks: &[TaskDefinition]) -> Result<(), EngineError> {
        if let Err(errors) = validate_task_definitions(tasks) {
            let fatal: Vec<ValidationError> = errors
                .into_iter()
                .filter(|e| matches!(e, ValidationError::DuplicateTaskId { .. }))
                .collect();
            if !fatal.is_empty() {
                return Err(EngineError::InvalidCatalog(fatal));
            }
        }

        match tasks.iter().find(|t| !self.work.contains(t.task_type)) {
            Some(task) => Err(EngineError::MissingWork {
                task_id: task.id.clone(),
                task_type: task.task_type,
            }),
            None => Ok(()),
        }
    }

    async fn run(
        &self,
        period: &mut ClosingPeriod,
        tasks: Vec<TaskDefinition>,
    ) -> Result<ClosingResult, EngineError> {
        let started = Instant::now();
        let grouping = self.grouper.group(&tasks);

        let shared_period = Arc::new(period.clone());
        let GroupRun {
            mut results,
            mut issues,
            phase,
        } = self.run_groups(&grouping, &shared_period).await;

        if !grouping.unplaced.is_empty() {
            Self::record_unplaced(&grouping, &mut results, &mut issues);
        }

        PhaseChanged {
            from: phase.as_str(),
            to: ClosePhase::Validating.as_str(),
        }
        .log();
        issues.extend(self.validation.validate(period, &tasks, &results));

        let failures = results.iter().filter(|r| r.is_failure()).count();
        let executed = results
            .iter()
            .filter(|r| r.status != TaskStatus::Skipped)
            .count();
        let status = ClosingStatus::from_counts(failures, executed);

        let report = self.reports.build(&results, issues);
        let total_duration = started.elapsed();
        let performance = self.performance.analyze(&results, total_duration);

        if status == ClosingStatus::Completed && period.status == PeriodStatus::Open {
            self.soft_close(period).await?;
        }

        let result = ClosingResult {
            period: period.clone(),
            status,
            task_results: results,
            report,
            performance,
            completed_at: Utc::now(),
            total_duration,
        };

        CloseCompleted {
            period_id: &period.id,
            status: &status.to_string(),
            task_count: result.task_results.len(),
            issue_count: result.report.issues.len(),
            duration: total_duration,
        }
        .log();

        self.notify(&result).await;
        PhaseChanged {
            from: ClosePhase::Validating.as_str(),
            to: ClosePhase::Done.as_str(),
        }
        .log();

        Ok(result)
    }

    async fn run_groups(&self, grouping: &Grouping, period: &Arc<ClosingPeriod>) -> GroupRun {
        let registry = InFlightRegistry::new();
        let mut results = Vec::new();
        let mut issues = Vec::new();
        let mut phase = ClosePhase::RunningGroups;
        let group_count = grouping.groups.len();

        for (index, group) in grouping.groups.iter().enumerate() {
            let group_started = Instant::now();
            GroupStarted {
                group_index: index,
                group_count,
                task_ids: &group.task_ids(),
            }
            .log();

            let group_results = self.run_group(group, period, &registry).await;

            GroupCompleted {
                group_index: index,
                task_count: group_results.len(),
                failures: group_results.iter().filter(|r| r.is_failure()).count(),
                duration: group_started.elapsed(),
            }
            .log();

            let critical_failed: Vec<String> = group
                .iter()
                .filter(|t| t.is_critical)
                .filter(|t| {
                    group_results
                        .iter()
                        .any(|r| r.task_id == t.id && r.is_failure())
                })
                .map(|t| t.id.clone())
                .collect();

            results.extend(group_results);

            if !critical_failed.is_empty() {
                let skipped_groups = group_count - index - 1;
                let failed_refs: Vec<&str> = critical_failed.iter().map(String::as_str).collect();
                CriticalFailureAbort {
                    group_index: index,
                    failed_tasks: &failed_refs,
                    skipped_groups,
                }
                .log();

                issues.push(
                    ClosingIssue::new(
                        IssueSeverity::High,
                        issue_types::CRITICAL_FAILURE,
                        format!(
                            "Critical task(s) failed: {}; {} remaining group(s) were not executed",
                            critical_failed.join(", "),
                            skipped_groups
                        ),
                    )
                    .with_suggested_action(
                        "Resolve the critical task failures and re-run the close",
                    )
                    .with_affected_tasks(critical_failed),
                );
                PhaseChanged {
                    from: phase.as_str(),
                    to: ClosePhase::AbortedEarly.as_str(),
                }
                .log();
                phase = ClosePhase::AbortedEarly;
                break;
            }
        }

        GroupRun {
            results,
            issues,
            phase,
        }
    }

    /// Execute every member of `group` concurrently and collect one result
    /// per member, in group order.
    pub(crate) async fn run_group(
        &self,
        group: &TaskGroup,
        period: &Arc<ClosingPeriod>,
        registry: &InFlightRegistry,
    ) -> Vec<TaskResult> {
        let permits = self.max_concurrency.unwrap_or(group.len()).max(1);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut dispatches = Vec::with_capacity(group.len());

        for task in group.iter() {
            if !registry.claim(&task.id).await {
                DuplicateDispatchRejected { task_id: &task.id }.log();
                dispatches.push(Dispatch::Refused(TaskResult::skipped(
                    task,
                    "task was already dispatched in this run",
                )));
                continue;
            }

            let Some(work) = self.work.get(task.task_type).cloned() else {
                registry.release(&task.id).await;
                dispatches.push(Dispatch::Refused(TaskResult::failed(
                    task,
                    Utc::now(),
                    Duration::ZERO,
                    format!("no work registered for task type {}", task.task_type),
                    0,
                )));
                continue;
            };

            let executor = self.executor;
            let owned_task = task.clone();
            let period = Arc::clone(period);
            let semaphore = Arc::clone(&semaphore);
            let registry = registry.clone();
            let dispatched = TaskDispatched {
                task_id: &task.id,
                task_type: task.task_type.as_str(),
                max_attempts: task.max_attempts(),
            };
            dispatched.log();
            let span = dispatched.span("execute");

            let handle = tokio::spawn(
                async move {
                    let result = match semaphore.acquire().await {
                        Ok(_permit) => executor.execute(&owned_task, &period, work.as_ref()).await,
                        Err(e) => TaskResult::failed(
                            &owned_task,
                            Utc::now(),
                            Duration::ZERO,
                            format!("failed to acquire concurrency permit: {}", e),
                            0,
                        ),
                    };
                    registry.release(&owned_task.id).await;
                    result
                }
                .instrument(span),
            );
            dispatches.push(Dispatch::Spawned(task, handle));
        }

        let mut results = Vec::with_capacity(dispatches.len());
        for dispatch in dispatches {
            match dispatch {
                Dispatch::Refused(result) => results.push(result),
                Dispatch::Spawned(task, handle) => {
                    let start_time = Utc::now();
                    match handle.await {
                        Ok(result) => results.push(result),
                        Err(join_error) => {
                            let error = join_error.to_string();
                            TaskJoinFailed {
                                task_id: &task.id,
                                error: &error,
                            }
                            .log();
                            registry.release(&task.id).await;
                            results.push(TaskResult::failed(
                                task,
                                start_time,
                                Duration::ZERO,
                                format!("task execution aborted: {}", error),
                                1,
                            ));
                        }
                    }
                }
            }
        }

        results
    }

    /// Unschedulable tasks become failures so a partial grouping can never
    /// soft-close the period.
    fn record_unplaced(
        grouping: &Grouping,
        results: &mut Vec<TaskResult>,
        issues: &mut Vec<ClosingIssue>,
    ) {
        let reason = match &grouping.cycle {
            Some(cycle) => format!("circular dependency: {}", cycle.join(" -> ")),
            None => "unresolvable dependency: task could not be scheduled".to_string(),
        };

        let now = Utc::now();
        let unplaced: Vec<String> = grouping.unplaced.iter().map(|t| t.id.clone()).collect();
        for task in &grouping.unplaced {
            results.push(TaskResult::failed(task, now, Duration::ZERO, reason.clone(), 0));
        }

        issues.push(
            ClosingIssue::new(
                IssueSeverity::High,
                issue_types::CIRCULAR_DEPENDENCY,
                format!(
                    "{} of {} task(s) could not be scheduled ({}): {}",
                    unplaced.len(),
                    grouping.total,
                    reason,
                    unplaced.join(", ")
                ),
            )
            .with_suggested_action("Fix the task dependency definitions and re-run the close")
            .with_affected_tasks(unplaced),
        );
    }

    async fn soft_close(&self, period: &mut ClosingPeriod) -> Result<(), EngineError> {
        let previous = period.status;
        self.status_store
            .update_status(period, PeriodStatus::SoftClose)
            .await
            .map_err(|source| EngineError::StatusUpdate {
                period_id: period.id.clone(),
                source,
            })?;
        period.status = PeriodStatus::SoftClose;

        PeriodStatusUpdated {
            period_id: &period.id,
            from: &previous.to_string(),
            to: &period.status.to_string(),
        }
        .log();
        Ok(())
    }

    async fn notify(&self, result: &ClosingResult) {
        let event = ClosingCompleted {
            period_id: result.period.id.clone(),
            status: result.status,
            duration: result.total_duration,
            task_count: result.task_results.len(),
            issue_count: result.report.issues.len(),
        };
        if let Err(e) = self.notifier.closing_completed(event).await {
            NotificationFailed {
                period_id: &result.period.id,
                error: &e,
            }
            .log();
        }
    }
}
