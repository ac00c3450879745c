// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::errors::{NotifyError, StoreError};
use crate::models::{ClosingPeriod, ClosingStatus, PeriodStatus};

/// Persists the lifecycle status of a period.
#[async_trait]
pub trait PeriodStatusStore: Send + Sync {
    async fn update_status(
        &self,
        period: &ClosingPeriod,
        new_status: PeriodStatus,
    ) -> Result<(), StoreError>;
}

/// Payload of the single notification sent at the end of every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosingCompleted {
    pub period_id: String,
    pub status: ClosingStatus,
    pub duration: Duration,
    pub task_count: usize,
    pub issue_count: usize,
}

/// Fire-and-forget sink for run notifications. Errors are logged by the
/// engine and otherwise ignored.
#[async_trait]
pub trait ClosingNotifier: Send + Sync {
    async fn closing_completed(&self, event: ClosingCompleted) -> Result<(), NotifyError>;
}
