// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::{DEFAULT_MIN_PARALLEL_SAVINGS_RATIO, DEFAULT_SLOW_TASK_THRESHOLD_SECS};
use crate::config::AnalysisConfig;
use crate::models::{Bottleneck, PerformanceMetrics, TaskResult};

const BOTTLENECK_COUNT: usize = 3;

/// Measures how much the grouped execution gained over running every task
/// back to back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceAnalyzer {
    slow_task_threshold: Duration,
    min_parallel_savings_ratio: f64,
}

impl Default for PerformanceAnalyzer {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_SLOW_TASK_THRESHOLD_SECS),
            DEFAULT_MIN_PARALLEL_SAVINGS_RATIO,
        )
    }
}

impl PerformanceAnalyzer {
    pub fn new(slow_task_threshold: Duration, min_parallel_savings_ratio: f64) -> Self {
        Self {
            slow_task_threshold,
            min_parallel_savings_ratio,
        }
    }

    pub fn from_config(cfg: &AnalysisConfig) -> Self {
        Self::new(cfg.slow_task_threshold(), cfg.min_parallel_savings_ratio())
    }

    pub fn analyze(&self, results: &[TaskResult], wall_clock: Duration) -> PerformanceMetrics {
        let sequential: Duration = results.iter().map(|r| r.duration).sum();
        let saved = sequential.saturating_sub(wall_clock);

        let mut by_duration: Vec<&TaskResult> = results.iter().collect();
        by_duration.sort_by(|a, b| b.duration.cmp(&a.duration));
        let bottleneck_tasks = by_duration
            .iter()
            .take(BOTTLENECK_COUNT)
            .map(|r| Bottleneck {
                task_id: r.task_id.clone(),
                duration: r.duration,
            })
            .collect();

        let mut optimization_suggestions = Vec::new();

        if !sequential.is_zero() {
            let ratio = saved.as_secs_f64() / sequential.as_secs_f64();
            if ratio < self.min_parallel_savings_ratio {
                optimization_suggestions.push(format!(
                    "Parallel execution saved {:.0}% of sequential task time (target {:.0}%); \
                     review task dependencies to run more work concurrently",
                    ratio * 100.0,
                    self.min_parallel_savings_ratio * 100.0
                ));
            }
        }

        for result in results.iter().filter(|r| r.duration > self.slow_task_threshold) {
            optimization_suggestions.push(format!(
                "Task '{}' took {:.1}s; consider optimizing or splitting it",
                result.task_id,
                result.duration.as_secs_f64()
            ));
        }

        PerformanceMetrics {
            total_execution_time: wall_clock,
            parallel_tasks_saved: saved,
            bottleneck_tasks,
            optimization_suggestions,
        }
    }
}
