// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Structural problems in a set of task definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected between tasks
    CyclicDependency {
        /// The cycle path, closed with its first element
        cycle: Vec<String>,
    },
    /// A task references a dependency that isn't scheduled in this run
    UnresolvedDependency {
        task_id: String,
        missing_dependency: String,
    },
    /// Two definitions share an id
    DuplicateTaskId { task_id: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                task_id,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Task '{}' depends on '{}' which is not scheduled",
                    task_id, missing_dependency
                )
            }
            ValidationError::DuplicateTaskId { task_id } => {
                write!(f, "Duplicate task ID: '{}'", task_id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
