// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Post-execution analysis of a close run.
//!
//! Runs after the last group finishes (or the run aborts):
//!
//! * [`validation`] inspects task results and raises [`ClosingIssue`]s
//! * [`report`] aggregates results and issues into a [`ClosingReport`]
//! * [`performance`] compares task durations against wall-clock time
//!
//! [`ClosingIssue`]: crate::models::ClosingIssue
//! [`ClosingReport`]: crate::models::ClosingReport

pub mod performance;
pub mod report;
pub mod validation;

pub use performance::PerformanceAnalyzer;
pub use report::ReportBuilder;
pub use validation::ValidationStage;

/// `issue_type` values raised by the engine and the validation stage.
pub mod issue_types {
    pub const CRITICAL_FAILURE: &str = "CRITICAL_FAILURE";
    pub const CIRCULAR_DEPENDENCY: &str = "CIRCULAR_DEPENDENCY";
    pub const TASK_FAILURES: &str = "TASK_FAILURES";
    pub const TASK_WARNINGS: &str = "TASK_WARNINGS";
    pub const INCOMPLETE_EXECUTION: &str = "INCOMPLETE_EXECUTION";
    pub const DURATION_OVERRUN: &str = "DURATION_OVERRUN";
}
