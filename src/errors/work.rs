// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors returned by the engine's external collaborators.

/// Failure reported by a task's work function. Always retryable from the
/// engine's point of view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkError {
    #[error("{0}")]
    Failed(String),

    #[error("upstream service unavailable: {0}")]
    Unavailable(String),

    #[error("work cancelled")]
    Cancelled,
}

impl WorkError {
    pub fn failed(message: impl Into<String>) -> Self {
        WorkError::Failed(message.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("period '{0}' not found")]
    PeriodNotFound(String),

    #[error("status store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification sink rejected event: {0}")]
    Rejected(String),
}
