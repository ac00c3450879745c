use std::sync::Arc;
use std::time::Duration;

use crate::analysis::issue_types;
use crate::backends::stub::{
    registry_of, task_definition, test_period, FailingStore, HangingWork, PanickingWork,
    RecordingNotifier, RejectingNotifier, ScriptedWork,
};
use crate::backends::{InMemoryPeriodStore, SimulatedWork};
use crate::engine::{ClosingEngine, InFlightRegistry, RetryPolicy};
use crate::errors::{EngineError, ValidationError};
use crate::models::{
    ClosingStatus, IssueSeverity, PeriodStatus, TaskGroup, TaskStatus, TaskType,
};
use crate::traits::WorkRegistry;

/// End-to-end close scenarios using in-process collaborators
#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(
        work: WorkRegistry,
        store: Arc<InMemoryPeriodStore>,
        notifier: Arc<RecordingNotifier>,
    ) -> ClosingEngine {
        ClosingEngine::new(work, store, notifier).with_retry_policy(RetryPolicy::immediate())
    }

    fn issue_types_of(result: &crate::models::ClosingResult) -> Vec<&str> {
        result
            .report
            .issues
            .iter()
            .map(|i| i.issue_type.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_monthly_close_completes_and_soft_closes_period() {
        let store = Arc::new(InMemoryPeriodStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = engine_with(SimulatedWork::registry(&[], 0.0), store.clone(), notifier.clone());

        let mut period = test_period();
        let result = engine.perform_continuous_close(&mut period).await.unwrap();

        assert_eq!(result.status, ClosingStatus::Completed);
        assert_eq!(result.task_results.len(), 8);
        assert!(result
            .task_results
            .iter()
            .all(|r| r.status == TaskStatus::Success));
        assert!(result.report.issues.is_empty());
        assert!(!result.report.approval_required);
        assert!(result.report.summary.total_entries > 0);

        assert_eq!(period.status, PeriodStatus::SoftClose);
        assert_eq!(result.period.status, PeriodStatus::SoftClose);
        assert_eq!(store.status_of(&period.id).await, Some(PeriodStatus::SoftClose));

        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, ClosingStatus::Completed);
        assert_eq!(events[0].task_count, 8);
        assert_eq!(events[0].issue_count, 0);
    }

    #[tokio::test]
    async fn test_dependencies_run_before_dependents() {
        let scripted = Arc::new(ScriptedWork::new());
        let engine = engine_with(
            registry_of(scripted.clone()),
            Arc::new(InMemoryPeriodStore::new()),
            Arc::new(RecordingNotifier::default()),
        );

        let mut period = test_period();
        engine.perform_continuous_close(&mut period).await.unwrap();

        let executed = scripted.executed();
        let position = |id: &str| executed.iter().position(|e| e == id).unwrap();
        assert!(position("accruals") < position("provisions"));
        assert!(position("provisions") < position("tax-calculation"));
        assert!(position("fx-revaluation") < position("tax-calculation"));
        assert_eq!(executed.last().map(String::as_str), Some("final-validation"));
    }

    #[tokio::test]
    async fn test_critical_failure_stops_later_groups() {
        // group 1 = {a, c}, group 2 = {b}
        let mut a = task_definition("a", TaskType::Accruals, 1, &[]);
        a.is_critical = true;
        let c = task_definition("c", TaskType::Depreciation, 2, &[]);
        let b = task_definition("b", TaskType::Provisions, 3, &["a"]);

        let scripted = Arc::new(ScriptedWork::new().fail("a"));
        let store = Arc::new(InMemoryPeriodStore::new());
        let engine = engine_with(
            registry_of(scripted.clone()),
            store.clone(),
            Arc::new(RecordingNotifier::default()),
        );

        let mut period = test_period();
        let result = engine
            .close_with_tasks(&mut period, vec![a, b, c])
            .await
            .unwrap();

        assert_eq!(result.result_for("a").unwrap().status, TaskStatus::Failure);
        assert_eq!(result.result_for("c").unwrap().status, TaskStatus::Success);
        assert!(result.result_for("b").is_none());
        assert!(!scripted.executed().contains(&"b".to_string()));

        let critical = result
            .report
            .issues
            .iter()
            .find(|i| i.issue_type == issue_types::CRITICAL_FAILURE)
            .unwrap();
        assert_eq!(critical.severity, IssueSeverity::High);
        assert_eq!(critical.affected_tasks, vec!["a".to_string()]);
        assert!(issue_types_of(&result).contains(&issue_types::INCOMPLETE_EXECUTION));

        assert_eq!(result.status, ClosingStatus::Failed);
        assert!(result.report.approval_required);
        assert_eq!(period.status, PeriodStatus::Open);
        assert_eq!(store.status_of(&period.id).await, None);
    }

    #[tokio::test]
    async fn test_non_critical_failure_gives_partial_close() {
        let store = Arc::new(InMemoryPeriodStore::new());
        let engine = engine_with(
            SimulatedWork::registry(&[TaskType::ForeignExchange], 0.0),
            store.clone(),
            Arc::new(RecordingNotifier::default()),
        );

        let mut period = test_period();
        let result = engine.perform_continuous_close(&mut period).await.unwrap();

        assert_eq!(result.status, ClosingStatus::Partial);
        assert_eq!(result.task_results.len(), 8);
        assert_eq!(
            result.result_for("fx-revaluation").unwrap().status,
            TaskStatus::Failure
        );
        assert_eq!(
            result.result_for("tax-calculation").unwrap().status,
            TaskStatus::Success
        );
        assert!(result.report.approval_required);
        assert_eq!(result.report.approvers, vec!["financial-controller", "cfo"]);
        assert_eq!(period.status, PeriodStatus::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_is_retried_with_default_backoff() {
        let store = Arc::new(InMemoryPeriodStore::new());
        let engine = ClosingEngine::new(
            SimulatedWork::registry(&[TaskType::Provisions], 0.0),
            store,
            Arc::new(RecordingNotifier::default()),
        );

        let mut provisions = task_definition("provisions", TaskType::Provisions, 1, &[]);
        provisions.retry_count = 2;

        let mut period = test_period();
        let result = engine
            .close_with_tasks(&mut period, vec![provisions])
            .await
            .unwrap();

        let provisions = result.result_for("provisions").unwrap();
        assert_eq!(provisions.status, TaskStatus::Failure);
        assert_eq!(provisions.attempts, 3);
        assert_eq!(provisions.duration, Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_cycle_is_reported_not_raised() {
        let root = task_definition("root", TaskType::Accruals, 1, &[]);
        let x = task_definition("x", TaskType::Provisions, 2, &["root", "y"]);
        let y = task_definition("y", TaskType::Provisions, 3, &["x"]);

        let notifier = Arc::new(RecordingNotifier::default());
        let engine = engine_with(
            registry_of(Arc::new(ScriptedWork::new())),
            Arc::new(InMemoryPeriodStore::new()),
            notifier.clone(),
        );

        let mut period = test_period();
        let result = engine
            .close_with_tasks(&mut period, vec![root, x, y])
            .await
            .unwrap();

        assert_eq!(result.result_for("root").unwrap().status, TaskStatus::Success);
        let x = result.result_for("x").unwrap();
        assert_eq!(x.status, TaskStatus::Failure);
        assert_eq!(x.attempts, 0);
        assert_eq!(x.errors, vec!["circular dependency: x -> y -> x".to_string()]);

        let cycle = result
            .report
            .issues
            .iter()
            .find(|i| i.issue_type == issue_types::CIRCULAR_DEPENDENCY)
            .unwrap();
        assert_eq!(cycle.severity, IssueSeverity::High);
        assert_eq!(cycle.affected_tasks, vec!["x".to_string(), "y".to_string()]);

        assert_eq!(result.status, ClosingStatus::Failed);
        assert_eq!(period.status, PeriodStatus::Open);
        assert_eq!(notifier.events().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_work_is_an_infrastructure_error() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut work = SimulatedWork::registry(&[], 0.0);
        work.0.remove(&TaskType::Validation);
        let engine = engine_with(work, Arc::new(InMemoryPeriodStore::new()), notifier.clone());

        let mut period = test_period();
        let err = engine.perform_continuous_close(&mut period).await.unwrap_err();

        match err {
            EngineError::MissingWork { task_id, task_type } => {
                assert_eq!(task_id, "final-validation");
                assert_eq!(task_type, TaskType::Validation);
            }
            other => panic!("Expected MissingWork, got {:?}", other),
        }
        assert!(notifier.events().is_empty());
        assert_eq!(period.status, PeriodStatus::Open);
    }

    #[tokio::test]
    async fn test_duplicate_task_ids_are_rejected() {
        let engine = engine_with(
            registry_of(Arc::new(ScriptedWork::new())),
            Arc::new(InMemoryPeriodStore::new()),
            Arc::new(RecordingNotifier::default()),
        );
        let tasks = vec![
            task_definition("accruals", TaskType::Accruals, 1, &[]),
            task_definition("accruals", TaskType::Accruals, 2, &[]),
        ];

        let mut period = test_period();
        let err = engine.close_with_tasks(&mut period, tasks).await.unwrap_err();
        match err {
            EngineError::InvalidCatalog(errors) => assert_eq!(
                errors,
                vec![ValidationError::DuplicateTaskId {
                    task_id: "accruals".into()
                }]
            ),
            other => panic!("Expected InvalidCatalog, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_store_failure_propagates() {
        let engine = ClosingEngine::new(
            SimulatedWork::registry(&[], 0.0),
            Arc::new(FailingStore),
            Arc::new(RecordingNotifier::default()),
        );

        let mut period = test_period();
        let err = engine.perform_continuous_close(&mut period).await.unwrap_err();

        assert!(matches!(err, EngineError::StatusUpdate { ref period_id, .. } if period_id == "2026-09"));
        assert_eq!(period.status, PeriodStatus::Open);
    }

    #[tokio::test]
    async fn test_status_store_untouched_when_not_completed() {
        let engine = ClosingEngine::new(
            SimulatedWork::registry(&[TaskType::Accruals], 0.0),
            Arc::new(FailingStore),
            Arc::new(RecordingNotifier::default()),
        )
        .with_retry_policy(RetryPolicy::immediate());

        let mut period = test_period();
        let result = engine.perform_continuous_close(&mut period).await.unwrap();
        assert_ne!(result.status, ClosingStatus::Completed);
    }

    #[tokio::test]
    async fn test_completed_close_leaves_non_open_period_alone() {
        for status in [PeriodStatus::HardClose, PeriodStatus::Archived] {
            let store = Arc::new(InMemoryPeriodStore::new());
            let engine = engine_with(
                SimulatedWork::registry(&[], 0.0),
                store.clone(),
                Arc::new(RecordingNotifier::default()),
            );

            let mut period = test_period();
            period.status = status;
            let result = engine.perform_continuous_close(&mut period).await.unwrap();

            assert_eq!(result.status, ClosingStatus::Completed);
            assert_eq!(period.status, status);
            assert_eq!(result.period.status, status);
            assert_eq!(store.status_of(&period.id).await, None);
        }
    }

    #[tokio::test]
    async fn test_notifier_error_does_not_fail_the_close() {
        let engine = ClosingEngine::new(
            SimulatedWork::registry(&[], 0.0),
            Arc::new(InMemoryPeriodStore::new()),
            Arc::new(RejectingNotifier),
        );

        let mut period = test_period();
        let result = engine.perform_continuous_close(&mut period).await.unwrap();
        assert_eq!(result.status, ClosingStatus::Completed);
    }

    #[tokio::test]
    async fn test_panicking_work_becomes_failure() {
        let work = registry_of(Arc::new(ScriptedWork::new()))
            .with(TaskType::Depreciation, Arc::new(PanickingWork));
        let engine = engine_with(
            work,
            Arc::new(InMemoryPeriodStore::new()),
            Arc::new(RecordingNotifier::default()),
        );
        let tasks = vec![
            task_definition("accruals", TaskType::Accruals, 1, &[]),
            task_definition("depreciation", TaskType::Depreciation, 2, &[]),
            task_definition("provisions", TaskType::Provisions, 3, &["accruals"]),
        ];

        let mut period = test_period();
        let result = engine.close_with_tasks(&mut period, tasks).await.unwrap();

        let depreciation = result.result_for("depreciation").unwrap();
        assert_eq!(depreciation.status, TaskStatus::Failure);
        assert!(depreciation.errors[0].starts_with("task execution aborted"));
        assert_eq!(
            result.result_for("provisions").unwrap().status,
            TaskStatus::Success
        );
        assert_eq!(result.status, ClosingStatus::Partial);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_task_times_out_inside_the_close() {
        let work = registry_of(Arc::new(ScriptedWork::new()))
            .with(TaskType::ForeignExchange, Arc::new(HangingWork));
        let engine = engine_with(
            work,
            Arc::new(InMemoryPeriodStore::new()),
            Arc::new(RecordingNotifier::default()),
        );
        let mut fx = task_definition("fx-revaluation", TaskType::ForeignExchange, 1, &[]);
        fx.timeout = Duration::from_secs(5);
        let tasks = vec![fx, task_definition("accruals", TaskType::Accruals, 2, &[])];

        let mut period = test_period();
        let result = engine.close_with_tasks(&mut period, tasks).await.unwrap();

        let fx = result.result_for("fx-revaluation").unwrap();
        assert_eq!(fx.status, TaskStatus::Failure);
        assert_eq!(fx.errors, vec!["Task timed out after 5s".to_string()]);
        assert_eq!(result.total_duration, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_concurrency_bounds_group_fan_out() {
        let tasks: Vec<_> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, id)| task_definition(id, TaskType::Accruals, i as u32, &[]))
            .collect();

        for (limit, expected_wall) in [(1, 3), (3, 1)] {
            let engine = engine_with(
                SimulatedWork::registry(&[], 1.0),
                Arc::new(InMemoryPeriodStore::new()),
                Arc::new(RecordingNotifier::default()),
            )
            .with_max_concurrency(limit);

            let mut period = test_period();
            let result = engine
                .close_with_tasks(&mut period, tasks.clone())
                .await
                .unwrap();

            assert_eq!(result.total_duration, Duration::from_secs(expected_wall));
            assert_eq!(
                result.performance.parallel_tasks_saved,
                Duration::from_secs(3 - expected_wall)
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_engine_dispatches_whole_group_at_once() {
        let tasks: Vec<_> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, id)| task_definition(id, TaskType::Accruals, i as u32, &[]))
            .collect();
        let engine = ClosingEngine::new(
            SimulatedWork::registry(&[], 1.0),
            Arc::new(InMemoryPeriodStore::new()),
            Arc::new(RecordingNotifier::default()),
        );

        let mut period = test_period();
        let result = engine.close_with_tasks(&mut period, tasks).await.unwrap();

        assert_eq!(result.total_duration, Duration::from_secs(1));
        assert_eq!(result.performance.parallel_tasks_saved, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_registry_refuses_second_dispatch() {
        let scripted = Arc::new(ScriptedWork::new());
        let engine = engine_with(
            registry_of(scripted.clone()),
            Arc::new(InMemoryPeriodStore::new()),
            Arc::new(RecordingNotifier::default()),
        );
        let task = task_definition("accruals", TaskType::Accruals, 1, &[]);
        let group = TaskGroup(vec![task.clone(), task]);
        let period = Arc::new(test_period());
        let registry = InFlightRegistry::new();

        let results = engine.run_group(&group, &period, &registry).await;
        assert_eq!(results[0].status, TaskStatus::Success);
        assert_eq!(results[1].status, TaskStatus::Skipped);

        let again = engine.run_group(&group, &period, &registry).await;
        assert!(again.iter().all(|r| r.status == TaskStatus::Skipped));

        assert_eq!(scripted.executed(), vec!["accruals".to_string()]);
        assert_eq!(registry.in_flight_count().await, 0);
    }
}
