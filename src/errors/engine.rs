// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{StoreError, ValidationError};
use crate::models::TaskType;

/// Infrastructure failures that abort a close before a `ClosingResult` exists.
///
/// Task-level failures never surface here; they are folded into task results.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("task catalog is invalid: {}", format_validation(.0))]
    InvalidCatalog(Vec<ValidationError>),

    #[error("no work registered for task '{task_id}' of type {task_type}")]
    MissingWork { task_id: String, task_type: TaskType },

    #[error("failed to update status of period '{period_id}': {source}")]
    StatusUpdate {
        period_id: String,
        #[source]
        source: StoreError,
    },
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
