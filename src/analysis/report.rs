// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::DEFAULT_APPROVERS;
use crate::models::{
    ClosingIssue, ClosingReport, IssueSeverity, ReportSummary, TaskResult, TaskStatus,
};

/// Builds the [`ClosingReport`] from final task results and issues.
///
/// Approval is required when any task failed or any issue is HIGH; the report
/// then lists the configured approver roles, otherwise none.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBuilder {
    approvers: Vec<String>,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_APPROVERS.iter().map(|a| a.to_string()).collect())
    }
}

impl ReportBuilder {
    pub fn new(approvers: Vec<String>) -> Self {
        Self { approvers }
    }

    pub fn build(&self, results: &[TaskResult], issues: Vec<ClosingIssue>) -> ClosingReport {
        let summary = summarize(results);
        let approval_required = summary.failed_tasks > 0 || issues.iter().any(ClosingIssue::is_high);
        let recommendations = recommend(results, &issues, &summary);

        ClosingReport {
            summary,
            details: results.to_vec(),
            issues,
            recommendations,
            approval_required,
            approvers: if approval_required {
                self.approvers.clone()
            } else {
                Vec::new()
            },
        }
    }
}

fn summarize(results: &[TaskResult]) -> ReportSummary {
    let count = |status: TaskStatus| results.iter().filter(|r| r.status == status).count();

    ReportSummary {
        total_tasks: results.len(),
        successful_tasks: count(TaskStatus::Success),
        failed_tasks: count(TaskStatus::Failure),
        warning_tasks: count(TaskStatus::Warning),
        skipped_tasks: count(TaskStatus::Skipped),
        total_entries: results.iter().filter_map(|r| r.entries_created).sum(),
        total_amount: results.iter().filter_map(|r| r.total_amount).sum(),
        total_task_duration: results.iter().map(|r| r.duration).sum::<Duration>(),
    }
}

fn recommend(
    results: &[TaskResult],
    issues: &[ClosingIssue],
    summary: &ReportSummary,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    for result in results.iter().filter(|r| r.is_failure()) {
        let reason = result
            .errors
            .last()
            .map(String::as_str)
            .unwrap_or("no error recorded");
        recommendations.push(format!(
            "Investigate and re-run task '{}' ({}): {}",
            result.task_id, result.task_type, reason
        ));
    }

    for issue in issues.iter().filter(|i| i.severity == IssueSeverity::High) {
        let action = issue
            .suggested_action
            .clone()
            .unwrap_or_else(|| format!("Resolve {}: {}", issue.issue_type, issue.description));
        if !recommendations.contains(&action) {
            recommendations.push(action);
        }
    }

    if summary.warning_tasks > 0 {
        recommendations.push(format!(
            "Review warnings on {} task(s) before hard close",
            summary.warning_tasks
        ));
    }

    if summary.failed_tasks == 0 && issues.is_empty() {
        recommendations
            .push("All closing tasks completed successfully; the period is ready for review".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::result_with;

    fn with_totals(id: &str, entries: u64, amount: f64) -> TaskResult {
        let mut r = result_with(id, TaskStatus::Success, 1);
        r.entries_created = Some(entries);
        r.total_amount = Some(amount);
        r
    }

    #[test]
    fn totals_are_summed() {
        let results = vec![
            with_totals("accruals", 3, 100.0),
            with_totals("depreciation", 5, 250.0),
            with_totals("provisions", 0, 0.0),
        ];
        let report = ReportBuilder::default().build(&results, Vec::new());

        assert_eq!(report.summary.total_entries, 8);
        assert_eq!(report.summary.total_amount, 350.0);
        assert_eq!(report.summary.total_tasks, 3);
        assert_eq!(report.summary.successful_tasks, 3);
        assert_eq!(report.summary.total_task_duration, Duration::from_secs(3));
        assert_eq!(report.details.len(), 3);
    }

    #[test]
    fn missing_totals_count_as_zero() {
        let results = vec![
            with_totals("accruals", 2, 10.0),
            result_with("bank-reconciliation", TaskStatus::Warning, 1),
        ];
        let report = ReportBuilder::default().build(&results, Vec::new());
        assert_eq!(report.summary.total_entries, 2);
        assert_eq!(report.summary.warning_tasks, 1);
    }

    #[test]
    fn clean_run_needs_no_approval() {
        let results = vec![result_with("accruals", TaskStatus::Success, 1)];
        let report = ReportBuilder::default().build(&results, Vec::new());

        assert!(!report.approval_required);
        assert!(report.approvers.is_empty());
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn failed_task_requires_approval() {
        let results = vec![
            result_with("accruals", TaskStatus::Success, 1),
            result_with("fx-revaluation", TaskStatus::Failure, 1),
        ];
        let report = ReportBuilder::default().build(&results, Vec::new());

        assert!(report.approval_required);
        assert_eq!(report.approvers, vec!["financial-controller", "cfo"]);
        assert_eq!(report.summary.failed_tasks, 1);
        assert!(report.recommendations[0].contains("fx-revaluation"));
    }

    #[test]
    fn high_issue_alone_requires_approval() {
        let results = vec![result_with("accruals", TaskStatus::Success, 1)];
        let issue = ClosingIssue::new(IssueSeverity::High, "CIRCULAR_DEPENDENCY", "loop")
            .with_suggested_action("Fix the task dependencies");
        let report = ReportBuilder::new(vec!["controller".into()]).build(&results, vec![issue]);

        assert!(report.approval_required);
        assert_eq!(report.approvers, vec!["controller"]);
        assert_eq!(report.recommendations, vec!["Fix the task dependencies"]);
    }

    #[test]
    fn low_issue_does_not_require_approval() {
        let results = vec![result_with("accruals", TaskStatus::Warning, 1)];
        let issue = ClosingIssue::new(IssueSeverity::Low, "TASK_WARNINGS", "warned");
        let report = ReportBuilder::default().build(&results, vec![issue]);

        assert!(!report.approval_required);
        assert!(report.approvers.is_empty());
    }
}
