// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::WorkError;
use crate::models::{ClosingPeriod, TaskDefinition, TaskStatus, TaskType};

/// What a work function hands back when it finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOutput {
    /// `Success` or `Warning`. Anything else is normalised to `Success`.
    pub status: TaskStatus,
    pub entries_created: Option<u64>,
    pub total_amount: Option<f64>,
    pub warnings: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl WorkOutput {
    pub fn success() -> Self {
        Self {
            status: TaskStatus::Success,
            entries_created: None,
            total_amount: None,
            warnings: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_entries(mut self, entries: u64, amount: f64) -> Self {
        self.entries_created = Some(entries);
        self.total_amount = Some(amount);
        self
    }

    /// Downgrade to WARNING and record why.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.status = TaskStatus::Warning;
        self.warnings.push(warning.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Per-attempt context passed to a work function.
///
/// `deadline` is when the executor stops waiting. `cancellation` fires at that
/// moment; work that spawns its own background jobs should watch it so nothing
/// keeps posting after the engine has moved on.
#[derive(Debug, Clone)]
pub struct WorkContext {
    /// Zero-based attempt index.
    pub attempt: u32,
    pub deadline: Instant,
    pub cancellation: CancellationToken,
}

impl WorkContext {
    pub fn new(attempt: u32, timeout: Duration) -> Self {
        Self {
            attempt,
            deadline: Instant::now() + timeout,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// The work behind one task type: posting entries, fetching rates, matching
/// statements. Implementations must tolerate being retried.
#[async_trait]
pub trait TaskWork: Send + Sync {
    async fn execute(
        &self,
        task: &TaskDefinition,
        period: &ClosingPeriod,
        ctx: &WorkContext,
    ) -> Result<WorkOutput, WorkError>;

    fn name(&self) -> &'static str;
}

/// Newtype wrapper mapping each task type to its work function
#[derive(Clone, Default)]
pub struct WorkRegistry(pub HashMap<TaskType, Arc<dyn TaskWork>>);

impl WorkRegistry {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, task_type: TaskType, work: Arc<dyn TaskWork>) {
        self.0.insert(task_type, work);
    }

    /// Builder-style insert.
    pub fn with(mut self, task_type: TaskType, work: Arc<dyn TaskWork>) -> Self {
        self.insert(task_type, work);
        self
    }

    pub fn get(&self, task_type: TaskType) -> Option<&Arc<dyn TaskWork>> {
        self.0.get(&task_type)
    }

    pub fn contains(&self, task_type: TaskType) -> bool {
        self.0.contains_key(&task_type)
    }
}

impl std::fmt::Debug for WorkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkRegistry")
            .field("work_count", &self.0.len())
            .field("task_types", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl From<HashMap<TaskType, Arc<dyn TaskWork>>> for WorkRegistry {
    fn from(map: HashMap<TaskType, Arc<dyn TaskWork>>) -> Self {
        Self(map)
    }
}
