//! Integration tests for the asynchronous build-check tier.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use genforge_validate::registry::TaskLookup;
use genforge_validate::task::TaskStatus;
use genforge_validate::tier_c::{AsyncValidator, ProgressUpdate, SimulatedBackend};
use genforge_validate::DEFAULT_TARGETS;

/// Poll a task until it reaches a terminal state.
async fn wait_for_terminal(validator: &AsyncValidator, task_id: &str) -> genforge_validate::BuildTask {
    for _ in 0..200 {
        if let TaskLookup::Found { task } = validator.query(task_id) {
            if task.status.is_terminal() {
                return task;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {task_id} never reached a terminal state");
}

#[tokio::test]
async fn default_targets_complete_in_order() -> anyhow::Result<()> {
    genforge_core::telemetry::init_for_tests();
    let validator = AsyncValidator::new(Arc::new(SimulatedBackend::default()), 2);
    let ticket = validator.submit(None, None).await?;

    assert!(ticket.task_id.starts_with("validate-"));
    assert_eq!(ticket.targets, DEFAULT_TARGETS);

    let task = wait_for_terminal(&validator, &ticket.task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100);
    assert!(task.completed_at.is_some());
    assert!(task.error.is_none());

    // Results are recorded strictly in target order.
    let order: Vec<_> = task.results.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(order, DEFAULT_TARGETS);
    assert!(task.results.iter().all(|r| r.passed));
    Ok(())
}

#[tokio::test]
async fn progress_advances_in_equal_increments() {
    let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let updates = Arc::clone(&updates);
        Arc::new(move |u: ProgressUpdate| {
            updates.lock().unwrap().push(u);
        }) as genforge_validate::ProgressSink
    };

    let validator = AsyncValidator::new(Arc::new(SimulatedBackend::default()), 1);
    let ticket = validator.submit(None, Some(sink)).await.unwrap();
    wait_for_terminal(&validator, &ticket.task_id).await;

    let seen: Vec<u8> = updates.lock().unwrap().iter().map(|u| u.progress).collect();
    assert_eq!(seen, vec![20, 40, 60, 80, 100]);
}

#[tokio::test]
async fn failing_target_marks_task_failed_and_pool_survives() {
    let backend = SimulatedBackend::default().fail_on("android");
    let validator = AsyncValidator::new(Arc::new(backend), 1);

    let failing = validator.submit(None, None).await.unwrap();
    let task = wait_for_terminal(&validator, &failing.task_id).await;
    assert_eq!(task.status, TaskStatus::Failed);
    let error = task.error.expect("failure message captured");
    assert!(error.contains("android"));
    // Only the target before the failure got a result.
    assert_eq!(task.results.len(), 1);

    // The same (single-worker) pool still serves new tasks.
    let ok = validator
        .submit(Some(vec!["web".to_string()]), None)
        .await
        .unwrap();
    let task = wait_for_terminal(&validator, &ok.task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn unknown_task_id_returns_sentinel() {
    let validator = AsyncValidator::new(Arc::new(SimulatedBackend::default()), 1);
    match validator.query("validate-00000000") {
        TaskLookup::NotFound { task_id } => assert_eq!(task_id, "validate-00000000"),
        TaskLookup::Found { .. } => panic!("expected NotFound"),
    }
}

#[tokio::test]
async fn custom_target_list_progress_splits_evenly() {
    let validator = AsyncValidator::new(Arc::new(SimulatedBackend::default()), 2);
    let ticket = validator
        .submit(Some(vec!["web".to_string(), "ios".to_string()]), None)
        .await
        .unwrap();
    let task = wait_for_terminal(&validator, &ticket.task_id).await;
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.results.len(), 2);
    assert_eq!(task.progress, 100);
}

#[tokio::test]
async fn concurrent_tasks_do_not_interfere() {
    let validator = Arc::new(AsyncValidator::new(
        Arc::new(SimulatedBackend::new(Duration::from_millis(2))),
        4,
    ));

    let mut tickets = Vec::new();
    for _ in 0..6 {
        tickets.push(validator.submit(None, None).await.unwrap());
    }

    for ticket in tickets {
        let task = wait_for_terminal(&validator, &ticket.task_id).await;
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.results.len(), DEFAULT_TARGETS.len());
    }
}
