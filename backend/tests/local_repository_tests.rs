//! Tests for LocalRepository through the repository traits.
//!
//! These cover pagination, search, ordering, cascading deletes, batch
//! semantics and concurrent access.

mod support;

use std::sync::Arc;

use chrono::{Duration, Utc};
use evv_backend::db::repository::{ScheduleRepository, TaskRepository, VisitRepository};
use evv_backend::db::LocalRepository;
use evv_backend::models::{ScheduleStatus, Task, TaskStatus, TaskStatusChange, Visit};
use support::{check_in_location, check_out_location, sample_schedule};

async fn seed_schedules(repo: &LocalRepository, names: &[&str]) {
    for name in names {
        repo.create_schedule(&sample_schedule(name)).await.unwrap();
    }
}

// =========================================================
// Listing and Search
// =========================================================

#[tokio::test]
async fn test_pagination_splits_into_pages() {
    let repo = LocalRepository::new();
    seed_schedules(&repo, &["Ann Lee", "Bob Ray", "Cid Moe", "Dee Fox", "Eve Kim"]).await;

    let page = repo.list_schedules(1, 1, None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 5);

    let last = repo.list_schedules(5, 1, None).await.unwrap();
    assert_eq!(last.items.len(), 1);
    let beyond = repo.list_schedules(6, 1, None).await.unwrap();
    assert!(beyond.items.is_empty());
}

#[tokio::test]
async fn test_single_page_when_limit_exceeds_total() {
    let repo = LocalRepository::new();
    seed_schedules(&repo, &["Ann Lee", "Bob Ray"]).await;

    let page = repo.list_schedules(1, 10, None).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let repo = LocalRepository::new();
    seed_schedules(&repo, &["First Client", "Second Client", "Third Client"]).await;

    let page = repo.list_schedules(1, 10, None).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|s| s.client_name.as_str()).collect();
    assert_eq!(names, vec!["Third Client", "Second Client", "First Client"]);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let repo = LocalRepository::new();
    let missed = sample_schedule("Missed Client");
    repo.create_schedule(&missed).await.unwrap();
    seed_schedules(&repo, &["Upcoming Client"]).await;
    repo.update_schedule_status(missed.id, ScheduleStatus::Missed)
        .await
        .unwrap();

    let page = repo
        .list_schedules(1, 10, Some(ScheduleStatus::Missed))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, missed.id);
}

#[tokio::test]
async fn test_search_is_case_insensitive_on_name_and_location() {
    let repo = LocalRepository::new();
    seed_schedules(&repo, &["John Doe", "Jane Roe"]).await;

    let by_name = repo.search_schedules("john", 1, 10).await.unwrap();
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.items[0].client_name, "John Doe");

    let by_location = repo.search_schedules("SPRINGFIELD", 1, 10).await.unwrap();
    assert_eq!(by_location.total, 2);
}

#[tokio::test]
async fn test_today_schedules_are_ordered_by_shift() {
    let repo = LocalRepository::new();
    let late = sample_schedule("Late Shift");
    let mut early = sample_schedule("Early Shift");
    early.shift_time = "06:00-10:00".to_string();
    repo.create_schedule(&late).await.unwrap();
    repo.create_schedule(&early).await.unwrap();

    let today = repo.list_today_schedules().await.unwrap();
    let ids: Vec<_> = today.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

// =========================================================
// Details and Cascade
// =========================================================

#[tokio::test]
async fn test_details_include_visit_and_tasks_in_creation_order() {
    let repo = LocalRepository::new();
    let schedule = sample_schedule("Detail Client");
    repo.create_schedule(&schedule).await.unwrap();
    let first = Task::new(schedule.id, "Bathing", None);
    let second = Task::new(schedule.id, "Medication", None);
    repo.create_task(&first).await.unwrap();
    repo.create_task(&second).await.unwrap();
    repo.start_visit(schedule.id, Utc::now(), check_in_location())
        .await
        .unwrap();

    let details = repo.get_schedule_with_details(schedule.id).await.unwrap();
    assert!(details.visit.is_some());
    let ids: Vec<_> = details.tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(details.schedule.visit_id.is_some());
}

#[tokio::test]
async fn test_delete_schedule_cascades() {
    let repo = LocalRepository::new();
    let schedule = sample_schedule("Cascade Client");
    repo.create_schedule(&schedule).await.unwrap();
    let task = Task::new(schedule.id, "Meal prep", None);
    repo.create_task(&task).await.unwrap();
    let visit = repo
        .start_visit(schedule.id, Utc::now(), check_in_location())
        .await
        .unwrap();

    repo.delete_schedule(schedule.id).await.unwrap();

    assert!(repo.get_schedule(schedule.id).await.unwrap_err().is_not_found());
    assert!(repo.get_visit(visit.id).await.unwrap_err().is_not_found());
    assert!(!repo.task_exists(task.id).await.unwrap());
    assert!(repo.delete_schedule(schedule.id).await.unwrap_err().is_not_found());
}

// =========================================================
// Visits
// =========================================================

#[tokio::test]
async fn test_visit_requires_existing_schedule() {
    let repo = LocalRepository::new();
    let orphan = Visit::begin(sample_schedule("Nobody").id, Utc::now(), check_in_location());

    let err = repo.create_visit(&orphan).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_end_visit_computes_duration_and_stats() {
    let repo = LocalRepository::new();
    let schedule = sample_schedule("Duration Client");
    repo.create_schedule(&schedule).await.unwrap();
    let start = Utc::now();
    let visit = repo
        .start_visit(schedule.id, start, check_in_location())
        .await
        .unwrap();

    let ended = repo
        .end_visit(visit.id, start + Duration::minutes(90), check_out_location())
        .await
        .unwrap();
    assert!(ended.is_completed());
    assert_eq!(ended.duration_minutes(), Some(90));

    let durations = repo.visit_duration_stats().await.unwrap();
    assert_eq!(durations.total_completed, 1);
    assert_eq!(durations.avg_duration, 90.0);

    let stats = repo.visit_stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.completed, 1);
}

// =========================================================
// Tasks
// =========================================================

#[tokio::test]
async fn test_batch_failure_keeps_earlier_rows() {
    let repo = LocalRepository::new();
    let schedule = sample_schedule("Batch Client");
    repo.create_schedule(&schedule).await.unwrap();
    let tasks: Vec<Task> = ["Bathing", "Dressing", "Feeding"]
        .iter()
        .map(|name| Task::new(schedule.id, *name, None))
        .collect();

    repo.fail_writes_after(2);
    let err = repo.create_tasks_batch(&tasks).await.unwrap_err();
    assert!(!err.is_not_found());
    repo.clear_faults();

    let stored = repo.list_tasks_by_schedule(schedule.id).await.unwrap();
    let ids: Vec<_> = stored.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![tasks[0].id, tasks[1].id]);
}

#[tokio::test]
async fn test_task_status_queries() {
    let repo = LocalRepository::new();
    let schedule = sample_schedule("Status Client");
    repo.create_schedule(&schedule).await.unwrap();
    let done = Task::new(schedule.id, "Walk", None);
    let skipped = Task::new(schedule.id, "Shopping", None);
    let open = Task::new(schedule.id, "Laundry", None);
    repo.create_tasks_batch(&[done.clone(), skipped.clone(), open.clone()])
        .await
        .unwrap();

    repo.update_task_status(done.id, &TaskStatusChange::new(TaskStatus::Completed, None).unwrap())
        .await
        .unwrap();
    repo.update_task_status(
        skipped.id,
        &TaskStatusChange::new(TaskStatus::NotCompleted, Some("Store closed".into())).unwrap(),
    )
    .await
    .unwrap();

    let attention = repo.list_incomplete_tasks_with_reason().await.unwrap();
    assert_eq!(attention.len(), 1);
    assert_eq!(attention[0].id, skipped.id);

    let pending = repo.list_tasks_by_status(TaskStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, open.id);

    let stats = repo.task_stats_by_schedule(schedule.id).await.unwrap();
    assert_eq!((stats.total, stats.completed, stats.pending, stats.not_completed), (3, 1, 1, 1));
    let rate = repo.task_completion_rate(schedule.id).await.unwrap();
    assert!((rate - 100.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_completion_rate_without_tasks_is_zero() {
    let repo = LocalRepository::new();
    let schedule = sample_schedule("Empty Client");
    repo.create_schedule(&schedule).await.unwrap();

    assert_eq!(repo.task_completion_rate(schedule.id).await.unwrap(), 0.0);
}

// =========================================================
// Fault Injection and Concurrency
// =========================================================

#[tokio::test]
async fn test_unhealthy_store() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);

    assert!(!repo.health_check().await.unwrap());
    let err = repo.list_schedules(1, 10, None).await.unwrap_err();
    assert!(err.is_retryable());

    repo.set_healthy(true);
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_concurrent_schedule_writes() {
    let repo = Arc::new(LocalRepository::new());

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.create_schedule(&sample_schedule(&format!("Client {:02}", i)))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stats = repo.schedule_stats().await.unwrap();
    assert_eq!(stats.total, 20);
    assert_eq!(stats.pending, 20);
}
