// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::errors::{NotifyError, StoreError, WorkError};
use crate::models::{
    ClosingPeriod, PeriodStatus, PeriodType, TaskDefinition, TaskResult, TaskStatus, TaskType,
};
use crate::traits::{
    ClosingCompleted, ClosingNotifier, PeriodStatusStore, TaskWork, WorkContext, WorkOutput,
    WorkRegistry,
};

/// A parallel, non-critical task with no retries, 1s estimate and 30s timeout.
pub fn task_definition(
    id: &str,
    task_type: TaskType,
    sequence: u32,
    deps: &[&str],
) -> TaskDefinition {
    TaskDefinition {
        id: id.to_string(),
        task_type,
        sequence,
        dependencies: deps.iter().map(|d| d.to_string()).collect(),
        is_parallel: true,
        is_critical: false,
        estimated_duration: Duration::from_secs(1),
        timeout: Duration::from_secs(30),
        retry_count: 0,
    }
}

/// An open monthly period for September 2026.
pub fn test_period() -> ClosingPeriod {
    ClosingPeriod::open(
        "2026-09",
        "acme",
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
        PeriodType::Monthly,
    )
}

/// A finished result with the given status and duration in seconds.
pub fn result_with(task_id: &str, status: TaskStatus, secs: u64) -> TaskResult {
    let now = Utc::now();
    TaskResult {
        task_id: task_id.to_string(),
        task_type: TaskType::Accruals,
        status,
        start_time: now,
        end_time: now,
        duration: Duration::from_secs(secs),
        entries_created: None,
        total_amount: None,
        errors: if status == TaskStatus::Failure {
            vec!["boom".to_string()]
        } else {
            Vec::new()
        },
        warnings: Vec::new(),
        metadata: HashMap::new(),
        attempts: 1,
    }
}

/// Registers `work` for every task type.
pub fn registry_of(work: Arc<dyn TaskWork>) -> WorkRegistry {
    TaskType::ALL
        .iter()
        .fold(WorkRegistry::new(), |registry, &task_type| {
            registry.with(task_type, Arc::clone(&work))
        })
}

/// Returns the same output on every call.
pub struct StaticWork {
    output: WorkOutput,
}

impl StaticWork {
    pub fn new(output: WorkOutput) -> Self {
        Self { output }
    }
}

#[async_trait]
impl TaskWork for StaticWork {
    async fn execute(
        &self,
        _task: &TaskDefinition,
        _period: &ClosingPeriod,
        _ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        Ok(self.output.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Fails every attempt with the same message.
pub struct FailingWork {
    message: String,
}

impl FailingWork {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl TaskWork for FailingWork {
    async fn execute(
        &self,
        _task: &TaskDefinition,
        _period: &ClosingPeriod,
        _ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        Err(WorkError::failed(self.message.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Fails the first `failures` calls, then succeeds.
pub struct FlakyWork {
    failures: u32,
    pub calls: AtomicU32,
}

impl FlakyWork {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl TaskWork for FlakyWork {
    async fn execute(
        &self,
        _task: &TaskDefinition,
        _period: &ClosingPeriod,
        _ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(WorkError::Unavailable("ledger service".to_string()))
        } else {
            Ok(WorkOutput::success())
        }
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Never finishes.
pub struct HangingWork;

#[async_trait]
impl TaskWork for HangingWork {
    async fn execute(
        &self,
        _task: &TaskDefinition,
        _period: &ClosingPeriod,
        _ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        std::future::pending::<Result<WorkOutput, WorkError>>().await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

/// Panics inside the spawned task.
pub struct PanickingWork;

#[async_trait]
impl TaskWork for PanickingWork {
    async fn execute(
        &self,
        task: &TaskDefinition,
        _period: &ClosingPeriod,
        _ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        panic!("work for '{}' panicked", task.id)
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Spawns a background job that watches the cancellation token, then hangs.
#[derive(Default)]
pub struct BackgroundJobWork {
    pub observed_cancellation: Arc<AtomicBool>,
}

#[async_trait]
impl TaskWork for BackgroundJobWork {
    async fn execute(
        &self,
        _task: &TaskDefinition,
        _period: &ClosingPeriod,
        ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        let token = ctx.cancellation.clone();
        let observed = Arc::clone(&self.observed_cancellation);
        tokio::spawn(async move {
            token.cancelled().await;
            observed.store(true, Ordering::SeqCst);
        });
        std::future::pending::<Result<WorkOutput, WorkError>>().await
    }

    fn name(&self) -> &'static str {
        "background-job"
    }
}

/// Wraps another work function, recording when each attempt started.
pub struct RecordingWork {
    inner: Arc<dyn TaskWork>,
    starts: Mutex<Vec<Instant>>,
}

impl RecordingWork {
    pub fn new(inner: Arc<dyn TaskWork>) -> Self {
        Self {
            inner,
            starts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.starts.lock().unwrap().len()
    }

    pub fn start_instants(&self) -> Vec<Instant> {
        self.starts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskWork for RecordingWork {
    async fn execute(
        &self,
        task: &TaskDefinition,
        period: &ClosingPeriod,
        ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        self.starts.lock().unwrap().push(Instant::now());
        self.inner.execute(task, period, ctx).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Succeeds with one entry per call unless the task id was marked failing;
/// records every task id it ran.
#[derive(Default)]
pub struct ScriptedWork {
    failing: HashSet<String>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, task_id: &str) -> Self {
        self.failing.insert(task_id.to_string());
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskWork for ScriptedWork {
    async fn execute(
        &self,
        task: &TaskDefinition,
        _period: &ClosingPeriod,
        _ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError> {
        self.executed.lock().unwrap().push(task.id.clone());
        if self.failing.contains(&task.id) {
            Err(WorkError::failed(format!("{} failed", task.id)))
        } else {
            Ok(WorkOutput::success().with_entries(1, 10.0))
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Keeps every event it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ClosingCompleted>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ClosingCompleted> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClosingNotifier for RecordingNotifier {
    async fn closing_completed(&self, event: ClosingCompleted) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct RejectingNotifier;

#[async_trait]
impl ClosingNotifier for RejectingNotifier {
    async fn closing_completed(&self, _event: ClosingCompleted) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected("queue full".to_string()))
    }
}

pub struct FailingStore;

#[async_trait]
impl PeriodStatusStore for FailingStore {
    async fn update_status(
        &self,
        _period: &ClosingPeriod,
        _new_status: PeriodStatus,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
