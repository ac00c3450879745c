// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_APPROVERS, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS,
    DEFAULT_MIN_PARALLEL_SAVINGS_RATIO, DEFAULT_OVERRUN_TOLERANCE,
    DEFAULT_SLOW_TASK_THRESHOLD_SECS, MAX_OVERRUN_TOLERANCE,
};
use crate::errors::ConfigError;
use crate::models::TaskType;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Engine configuration, typically loaded from a YAML file.
///
/// Every section is optional; anything left out falls back to the built-in
/// defaults in [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// executor_options:
///   max_concurrency: 4
/// retry:
///   base_delay_ms: 1000
///   multiplier: 2
///   max_delay_ms: 60000
/// analysis:
///   slow_task_threshold_seconds: 60
///   min_parallel_savings_ratio: 0.3
/// approvers: [financial-controller, cfo]
/// task_overrides:
///   accruals:
///     timeout_seconds: 600
///     retry_count: 3
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub approvers: Option<Vec<String>>,
    /// Keyed by task type name (`accruals`, `foreign_exchange`, ...).
    #[serde(default)]
    pub task_overrides: HashMap<String, TaskOverride>,
}

impl Config {
    pub fn approvers(&self) -> Vec<String> {
        self.approvers.clone().unwrap_or_else(|| {
            DEFAULT_APPROVERS.iter().map(|a| a.to_string()).collect()
        })
    }

    /// Overrides resolved to task types. Unknown keys are skipped here and
    /// reported by [`Config::validate`].
    pub fn resolved_overrides(&self) -> HashMap<TaskType, TaskOverride> {
        self.task_overrides
            .iter()
            .filter_map(|(name, o)| TaskType::parse(name).map(|t| (t, o.clone())))
            .collect()
    }

    /// Check value ranges, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.executor_options.max_concurrency == Some(0) {
            problems.push("executor_options.max_concurrency must be at least 1".to_string());
        }
        if self.retry.multiplier() < 1 {
            problems.push("retry.multiplier must be at least 1".to_string());
        }
        if self.retry.max_delay() < self.retry.base_delay() {
            problems.push("retry.max_delay_ms must not be below retry.base_delay_ms".to_string());
        }
        if self.analysis.slow_task_threshold().is_zero() {
            problems.push("analysis.slow_task_threshold_seconds must be positive".to_string());
        }
        let ratio = self.analysis.min_parallel_savings_ratio();
        if !(0.0..=1.0).contains(&ratio) {
            problems.push(format!(
                "analysis.min_parallel_savings_ratio must be within [0, 1], got {}",
                ratio
            ));
        }
        let tolerance = self.analysis.overrun_tolerance();
        if !(0.0..=MAX_OVERRUN_TOLERANCE).contains(&tolerance) {
            problems.push(format!(
                "analysis.overrun_tolerance must be within [0, {}], got {}",
                MAX_OVERRUN_TOLERANCE, tolerance
            ));
        }
        if matches!(&self.approvers, Some(list) if list.is_empty()) {
            problems.push("approvers must not be empty".to_string());
        }
        for name in self.task_overrides.keys() {
            if TaskType::parse(name).is_none() {
                problems.push(format!("task_overrides: unknown task type '{}'", name));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    /// Maximum number of tasks running at once inside a group. Unset means
    /// every member of a group is dispatched at once.
    pub max_concurrency: Option<usize>,
}

impl ExecutorOptions {
    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }
}

/// Exponential backoff settings.
#[derive(Debug, Default, Deserialize)]
pub struct RetryConfig {
    pub base_delay_ms: Option<u64>,
    pub multiplier: Option<u32>,
    pub max_delay_ms: Option<u64>,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS))
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier.unwrap_or(DEFAULT_BACKOFF_MULTIPLIER)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS))
    }
}

/// Thresholds used by the validation stage and performance analyzer.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisConfig {
    pub slow_task_threshold_seconds: Option<u64>,
    pub min_parallel_savings_ratio: Option<f64>,
    pub overrun_tolerance: Option<f64>,
}

impl AnalysisConfig {
    pub fn slow_task_threshold(&self) -> Duration {
        Duration::from_secs(
            self.slow_task_threshold_seconds
                .unwrap_or(DEFAULT_SLOW_TASK_THRESHOLD_SECS),
        )
    }

    pub fn min_parallel_savings_ratio(&self) -> f64 {
        self.min_parallel_savings_ratio
            .unwrap_or(DEFAULT_MIN_PARALLEL_SAVINGS_RATIO)
    }

    pub fn overrun_tolerance(&self) -> f64 {
        self.overrun_tolerance.unwrap_or(DEFAULT_OVERRUN_TOLERANCE)
    }
}

/// Per-task-type adjustments applied on top of the catalog table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskOverride {
    pub timeout_seconds: Option<u64>,
    pub retry_count: Option<u32>,
    pub estimated_seconds: Option<u64>,
    pub critical: Option<bool>,
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config from a YAML file and check its value ranges
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
