//! Tests for db::repository::error module.

use evv_backend::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, ScheduleRepository, TaskRepository,
    TransactionalRepository, VisitRepository,
};
use evv_backend::db::LocalRepository;
use evv_backend::models::{Coordinates, Schedule, ScheduleId, TaskId, Visit};

fn nyc() -> Coordinates {
    Coordinates::new(40.7128, -74.0060)
}

#[test]
fn test_error_context_display() {
    let full = ErrorContext::new("get_task")
        .with_entity("task")
        .with_entity_id("abc");
    assert_eq!(full.to_string(), "(in get_task, task abc)");

    let entity_only = ErrorContext::new("list_visits_by_status").with_entity("visit");
    assert_eq!(entity_only.to_string(), "(in list_visits_by_status, visit)");

    assert_eq!(ErrorContext::default().to_string(), "(in unknown)");
}

#[test]
fn test_error_messages_carry_context() {
    let err = RepositoryError::query("injected failure", ErrorContext::new("create_task"));
    assert_eq!(
        err.to_string(),
        "Query error: injected failure (in create_task)"
    );

    let err = RepositoryError::configuration("Invalid repository type: cassandra");
    assert!(err.to_string().starts_with("Configuration error"));
    assert!(err.context().is_none());
}

#[test]
fn test_retryable_classification() {
    let ctx = ErrorContext::new("op");
    assert!(RepositoryError::unavailable("down", ctx.clone()).is_retryable());
    assert!(RepositoryError::transaction("commit failed", ctx.clone()).is_retryable());
    assert!(!RepositoryError::query("bad", ctx.clone()).is_retryable());
    assert!(!RepositoryError::not_found("gone", ctx.clone()).is_retryable());
    assert!(!RepositoryError::constraint("dup", ctx).is_retryable());
}

#[tokio::test]
async fn test_local_store_not_found_context() {
    let repo = LocalRepository::new();
    let id = TaskId::generate();

    let err = repo.get_task(id).await.unwrap_err();
    assert!(err.is_not_found());
    let ctx = err.context().unwrap();
    assert_eq!(ctx.operation.as_deref(), Some("get_task"));
    assert_eq!(ctx.entity.as_deref(), Some("task"));
    assert_eq!(ctx.entity_id, Some(id.to_string()));
}

#[tokio::test]
async fn test_local_store_duplicate_visit_is_constraint() {
    let repo = LocalRepository::new();
    let schedule = Schedule::new("John Doe", "09:00-17:00", "123 Main St");
    repo.create_schedule(&schedule).await.unwrap();
    repo.create_visit(&Visit::begin(schedule.id, chrono::Utc::now(), nyc()))
        .await
        .unwrap();

    let err = repo
        .create_visit(&Visit::begin(schedule.id, chrono::Utc::now(), nyc()))
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());
    assert_eq!(
        err.context().and_then(|c| c.entity_id.clone()),
        Some(schedule.id.to_string())
    );
}

#[tokio::test]
async fn test_local_store_fault_kinds() {
    let repo = LocalRepository::new();

    repo.set_healthy(false);
    let err = repo.list_schedules(1, 10, None).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Unavailable { .. }));
    repo.clear_faults();

    repo.fail_operation("list_tasks_by_schedule");
    let err = repo
        .list_tasks_by_schedule(ScheduleId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Query { .. }));
    repo.clear_faults();

    repo.fail_operation("commit");
    let uow = repo.begin().await.unwrap();
    let err = uow.commit().unwrap_err();
    assert!(matches!(err, RepositoryError::Transaction { .. }));
    assert!(err.is_retryable());
}

#[test]
fn test_repository_result() {
    let err: RepositoryResult<i32> = Err(RepositoryError::not_found(
        "schedule not found",
        ErrorContext::new("get_schedule").with_entity("schedule"),
    ));
    assert!(err.is_err_and(|e| e.is_not_found()));
}
