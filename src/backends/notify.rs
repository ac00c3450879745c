// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::NotifyError;
use crate::observability::messages::engine::CompletionPublished;
use crate::observability::messages::StructuredLog;
use crate::traits::{ClosingCompleted, ClosingNotifier};

/// Publishes completion events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl ClosingNotifier for TracingNotifier {
    async fn closing_completed(&self, event: ClosingCompleted) -> Result<(), NotifyError> {
        CompletionPublished {
            period_id: &event.period_id,
            status: &event.status.to_string(),
            task_count: event.task_count,
            issue_count: event.issue_count,
        }
        .log();
        Ok(())
    }
}
