//! Task repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ScheduleId, StatusCounts, Task, TaskId, TaskStatus, TaskStatusChange};

/// Repository trait for tasks.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get_task(&self, id: TaskId) -> RepositoryResult<Task>;

    /// Tasks of a schedule, oldest first.
    async fn list_tasks_by_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<Vec<Task>>;

    /// Tasks in `status`, newest first.
    async fn list_tasks_by_status(&self, status: TaskStatus) -> RepositoryResult<Vec<Task>>;

    /// `not_completed` tasks that carry a reason, newest first.
    async fn list_incomplete_tasks_with_reason(&self) -> RepositoryResult<Vec<Task>>;

    async fn create_task(&self, task: &Task) -> RepositoryResult<()>;

    /// Insert several tasks.
    ///
    /// Each row is written on its own. The first failure is returned and
    /// rows written before it stay in place.
    async fn create_tasks_batch(&self, tasks: &[Task]) -> RepositoryResult<()>;

    /// Replace a stored task. Fails with NotFound if it does not exist.
    async fn update_task(&self, task: &Task) -> RepositoryResult<()>;

    /// Apply a status change and return the updated task.
    ///
    /// `completed_at` is set to the current time for `completed` and cleared
    /// for any other status.
    async fn update_task_status(
        &self,
        id: TaskId,
        change: &TaskStatusChange,
    ) -> RepositoryResult<Task>;

    async fn update_task_reason(&self, id: TaskId, reason: &str) -> RepositoryResult<()>;

    async fn task_exists(&self, id: TaskId) -> RepositoryResult<bool>;

    async fn delete_task(&self, id: TaskId) -> RepositoryResult<()>;

    /// Percentage of completed tasks for a schedule; `0.0` if it has none.
    async fn task_completion_rate(&self, schedule_id: ScheduleId) -> RepositoryResult<f64>;

    async fn task_stats_by_schedule(&self, schedule_id: ScheduleId)
        -> RepositoryResult<StatusCounts>;

    async fn overall_task_stats(&self) -> RepositoryResult<StatusCounts>;
}
