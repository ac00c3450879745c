// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

use crate::engine::retry::{AttemptOutcome, RetryDecision, RetryPolicy};
use crate::models::{ClosingPeriod, TaskDefinition, TaskResult, TaskStatus};
use crate::observability::messages::task::{
    TaskAttemptFailed, TaskFinished, TaskRetryScheduled, TaskTimedOut,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{TaskWork, WorkContext, WorkOutput};

/// Runs one task to a final [`TaskResult`].
///
/// Each attempt races the work against the task's timeout. Failures and
/// timeouts are fed to the [`RetryPolicy`], which either schedules another
/// attempt after a backoff or gives up. Nothing here returns an error: every
/// way a task can end is folded into the result.
///
/// On timeout the attempt's future is dropped and its cancellation token is
/// fired, so in-process work stops at its next await point and any background
/// job the work spawned is told to stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskExecutor {
    policy: RetryPolicy,
}

impl TaskExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub async fn execute(
        &self,
        task: &TaskDefinition,
        period: &ClosingPeriod,
        work: &dyn TaskWork,
    ) -> TaskResult {
        let start_time = Utc::now();
        let started = Instant::now();

        let mut attempt = 0;
        loop {
            let outcome = self.run_attempt(task, period, work, attempt).await;
            let decision = self.policy.decide(attempt, task.retry_count, &outcome);

            match (decision, outcome) {
                (RetryDecision::Finish, AttemptOutcome::Success(output)) => {
                    return Self::finish(
                        Self::success_result(task, start_time, started.elapsed(), output, attempt + 1),
                    );
                }
                (RetryDecision::RetryAfter(delay), _) => {
                    TaskRetryScheduled {
                        task_id: &task.id,
                        next_attempt: attempt + 2,
                        delay,
                    }
                    .log();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                (_, outcome) => {
                    let error = outcome
                        .error_message()
                        .unwrap_or_else(|| "task ended without a result".to_string());
                    return Self::finish(TaskResult::failed(
                        task,
                        start_time,
                        started.elapsed(),
                        error,
                        attempt + 1,
                    ));
                }
            }
        }
    }

    async fn run_attempt(
        &self,
        task: &TaskDefinition,
        period: &ClosingPeriod,
        work: &dyn TaskWork,
        attempt: u32,
    ) -> AttemptOutcome {
        let ctx = WorkContext::new(attempt, task.timeout);

        match tokio::time::timeout(task.timeout, work.execute(task, period, &ctx)).await {
            Ok(Ok(output)) => AttemptOutcome::Success(output),
            Ok(Err(e)) => {
                let error = e.to_string();
                TaskAttemptFailed {
                    task_id: &task.id,
                    attempt: attempt + 1,
                    max_attempts: task.max_attempts(),
                    error: &error,
                }
                .log();
                AttemptOutcome::Failure { error }
            }
            Err(_) => {
                ctx.cancellation.cancel();
                TaskTimedOut {
                    task_id: &task.id,
                    attempt: attempt + 1,
                    timeout: task.timeout,
                }
                .log();
                AttemptOutcome::TimedOut {
                    after: task.timeout,
                }
            }
        }
    }

    fn success_result(
        task: &TaskDefinition,
        start_time: DateTime<Utc>,
        duration: Duration,
        output: WorkOutput,
        attempts: u32,
    ) -> TaskResult {
        let status = match output.status {
            TaskStatus::Warning => TaskStatus::Warning,
            _ => TaskStatus::Success,
        };
        TaskResult {
            task_id: task.id.clone(),
            task_type: task.task_type,
            status,
            start_time,
            end_time: Utc::now(),
            duration,
            entries_created: output.entries_created,
            total_amount: output.total_amount,
            errors: Vec::new(),
            warnings: output.warnings,
            metadata: output.metadata,
            attempts,
        }
    }

    fn finish(result: TaskResult) -> TaskResult {
        let status = result.status.to_string();
        TaskFinished {
            task_id: &result.task_id,
            status: &status,
            attempts: result.attempts,
            duration: result.duration,
            failed: result.is_failure(),
        }
        .log();
        result
    }
}
