//! Integration tests for TaskService.

mod support;

use evv_backend::db::repository::{ScheduleRepository, TaskRepository};
use evv_backend::models::{NewTask, ScheduleId, TaskId, TaskStatus, TaskUpdate};
use evv_backend::services::ServiceError;
use support::{harness, sample_schedule, Harness};

async fn seeded() -> (Harness, ScheduleId) {
    let h = harness();
    let schedule = sample_schedule("Task Client");
    h.store.create_schedule(&schedule).await.unwrap();
    (h, schedule.id)
}

fn new_task(name: &str) -> NewTask {
    NewTask {
        name: name.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn test_create_task_is_pending() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(
            schedule_id,
            "Medication",
            Some("Give morning pills with water".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.completed_at, None);
    let stored = h.services.tasks.get_task_by_id(task.id).await.unwrap();
    assert_eq!(stored, task);
}

#[tokio::test]
async fn test_create_task_validation() {
    let (h, schedule_id) = seeded().await;

    let err = h
        .services
        .tasks
        .create_task(schedule_id, "X", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = h
        .services
        .tasks
        .create_task(schedule_id, "Medication", Some("too short".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = h
        .services
        .tasks
        .create_task(ScheduleId::generate(), "Medication", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn test_not_completed_requires_reason() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(schedule_id, "Walk", None)
        .await
        .unwrap();

    let err = h
        .services
        .tasks
        .update_task_status(task.id, "not_completed", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = h
        .services
        .tasks
        .update_task_status(task.id, "not_completed", Some("   ".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let updated = h
        .services
        .tasks
        .update_task_status(task.id, "not_completed", Some("Client declined".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::NotCompleted);
    assert_eq!(updated.reason.as_deref(), Some("Client declined"));
    assert_eq!(updated.completed_at, None);
}

#[tokio::test]
async fn test_completed_at_follows_status() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(schedule_id, "Bathing", None)
        .await
        .unwrap();

    let completed = h
        .services
        .tasks
        .update_task_status(task.id, "completed", None)
        .await
        .unwrap();
    assert!(completed.completed_at.is_some());

    let reopened = h
        .services
        .tasks
        .update_task_status(task.id, "pending", None)
        .await
        .unwrap();
    assert_eq!(reopened.completed_at, None);
}

#[tokio::test]
async fn test_update_task_status_errors() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(schedule_id, "Bathing", None)
        .await
        .unwrap();

    let err = h
        .services
        .tasks
        .update_task_status(task.id, "done", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = h
        .services
        .tasks
        .update_task_status(TaskId::generate(), "completed", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn test_partial_update_keeps_untouched_fields() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(
            schedule_id,
            "Meal prep",
            Some("Prepare lunch and dinner".to_string()),
        )
        .await
        .unwrap();

    let updated = h
        .services
        .tasks
        .update_task(
            task.id,
            TaskUpdate {
                name: Some("Meal preparation".to_string()),
                description: Some(String::new()),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Meal preparation");
    assert_eq!(updated.description, task.description);
    assert_eq!(updated.status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_partial_update_reapplies_reason_rule() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(schedule_id, "Shopping", None)
        .await
        .unwrap();

    let err = h
        .services
        .tasks
        .update_task(
            task.id,
            TaskUpdate {
                status: Some("not_completed".to_string()),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    h.services
        .tasks
        .update_task_reason(task.id, "Store closed")
        .await
        .unwrap();
    let updated = h
        .services
        .tasks
        .update_task(
            task.id,
            TaskUpdate {
                status: Some("not_completed".to_string()),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::NotCompleted);
    assert_eq!(updated.reason.as_deref(), Some("Store closed"));

    let stored = h.store.get_task(task.id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_update_task_reason_rejects_empty() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(schedule_id, "Shopping", None)
        .await
        .unwrap();

    let err = h
        .services
        .tasks
        .update_task_reason(task.id, "")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn test_batch_creation() {
    let (h, schedule_id) = seeded().await;
    let tasks = h
        .services
        .tasks
        .create_batch_tasks(schedule_id, vec![new_task("Bathing"), new_task("Dressing")])
        .await
        .unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));

    let err = h
        .services
        .tasks
        .create_batch_tasks(ScheduleId::generate(), vec![new_task("Bathing")])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    let err = h
        .services
        .tasks
        .create_batch_tasks(schedule_id, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn test_batch_failure_is_not_rolled_back() {
    let (h, schedule_id) = seeded().await;
    h.store.fail_writes_after(1);

    let err = h
        .services
        .tasks
        .create_batch_tasks(
            schedule_id,
            vec![new_task("Bathing"), new_task("Dressing"), new_task("Feeding")],
        )
        .await
        .unwrap_err();
    assert!(err.is_storage_failure());
    h.store.clear_faults();

    let stored = h.services.tasks.get_tasks_by_schedule_id(schedule_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Bathing");
}

#[tokio::test]
async fn test_mark_pending_tasks_as_not_completed() {
    let (h, schedule_id) = seeded().await;
    let tasks = h
        .services
        .tasks
        .create_batch_tasks(
            schedule_id,
            vec![new_task("Bathing"), new_task("Dressing"), new_task("Feeding")],
        )
        .await
        .unwrap();
    h.services
        .tasks
        .update_task_status(tasks[0].id, "completed", None)
        .await
        .unwrap();

    let updated = h
        .services
        .tasks
        .mark_pending_tasks_as_not_completed(schedule_id, "Client hospitalized")
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let attention = h.services.tasks.get_tasks_requiring_attention().await.unwrap();
    assert_eq!(attention.len(), 2);
    assert!(attention
        .iter()
        .all(|t| t.reason.as_deref() == Some("Client hospitalized")));

    let err = h
        .services
        .tasks
        .mark_pending_tasks_as_not_completed(schedule_id, "")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn test_mark_pending_stops_at_first_failure() {
    let (h, schedule_id) = seeded().await;
    h.services
        .tasks
        .create_batch_tasks(
            schedule_id,
            vec![new_task("Bathing"), new_task("Dressing"), new_task("Feeding")],
        )
        .await
        .unwrap();

    h.store.fail_writes_after(1);
    let err = h
        .services
        .tasks
        .mark_pending_tasks_as_not_completed(schedule_id, "Visit cancelled")
        .await
        .unwrap_err();
    assert!(err.is_storage_failure());
    h.store.clear_faults();

    let stats = h
        .services
        .tasks
        .get_task_stats_by_schedule(schedule_id)
        .await
        .unwrap();
    assert_eq!(stats.not_completed, 1);
    assert_eq!(stats.pending, 2);
}

#[tokio::test]
async fn test_validate_task_update_checks_owner() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(schedule_id, "Bathing", None)
        .await
        .unwrap();

    h.services
        .tasks
        .validate_task_update(task.id, schedule_id)
        .await
        .unwrap();
    let err = h
        .services
        .tasks
        .validate_task_update(task.id, ScheduleId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_generate_task_report() {
    let (h, schedule_id) = seeded().await;
    let tasks = h
        .services
        .tasks
        .create_batch_tasks(
            schedule_id,
            vec![new_task("Bathing"), new_task("Dressing"), new_task("Feeding"), new_task("Walking")],
        )
        .await
        .unwrap();
    h.services
        .tasks
        .update_task_status(tasks[0].id, "completed", None)
        .await
        .unwrap();
    h.services
        .tasks
        .update_task_status(tasks[1].id, "not_completed", Some("Refused".to_string()))
        .await
        .unwrap();

    let report = h.services.tasks.generate_task_report(schedule_id).await.unwrap();
    assert_eq!(report.schedule_id, schedule_id);
    assert_eq!(report.client_name, "Task Client");
    assert_eq!(report.total_tasks, 4);
    assert_eq!(report.completed, 1);
    assert_eq!(report.pending, 2);
    assert_eq!(report.not_completed, 1);
    assert_eq!(report.completion_rate, 25.0);
    assert_eq!(report.tasks.len(), 4);

    let rate = h
        .services
        .tasks
        .get_task_completion_rate(schedule_id)
        .await
        .unwrap();
    assert_eq!(rate, 25.0);
    let overall = h.services.tasks.get_overall_task_stats().await.unwrap();
    assert_eq!(overall.total, 4);
    let pending = h.services.tasks.get_tasks_by_status("pending").await.unwrap();
    assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn test_delete_task() {
    let (h, schedule_id) = seeded().await;
    let task = h
        .services
        .tasks
        .create_task(schedule_id, "Bathing", None)
        .await
        .unwrap();

    h.services.tasks.delete_task(task.id).await.unwrap();
    assert!(!h.store.task_exists(task.id).await.unwrap());
    let err = h.services.tasks.delete_task(task.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}
