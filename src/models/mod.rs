// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data model shared by the catalog, the engine and the analysis stages.

mod period;
mod report;
mod result;
mod task;

pub use period::{ClosingPeriod, PeriodStatus, PeriodType};
pub use report::{
    Bottleneck, ClosingReport, ClosingResult, ClosingStatus, PerformanceMetrics, ReportSummary,
};
pub use result::{ClosingIssue, IssueSeverity, TaskResult, TaskStatus};
pub use task::{TaskDefinition, TaskGroup, TaskType};
