//! Task lifecycle: `pending -> completed | not_completed`.
//!
//! A task may only become `not_completed` with a non-empty reason. Batch
//! operations write task by task and stop at the first failure without
//! undoing earlier writes.

use std::sync::Arc;

use chrono::Utc;
use log::info;

use super::error::{ServiceError, ServiceResult, StorageContext};
use crate::db::repository::{ScheduleRepository, TaskRepository};
use crate::db::Repositories;
use crate::models::{
    NewTask, ScheduleId, StatusCounts, Task, TaskId, TaskReport, TaskStatus, TaskStatusChange,
    TaskUpdate,
};
use crate::validation::{validate_task_description, validate_task_name, ValidationError};

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    schedules: Arc<dyn ScheduleRepository>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TaskService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            tasks: Arc::clone(&repos.tasks),
            schedules: Arc::clone(&repos.schedules),
        }
    }

    async fn ensure_schedule(&self, schedule_id: ScheduleId) -> ServiceResult<()> {
        self.schedules
            .get_schedule(schedule_id)
            .await
            .storage_context("get schedule")
            .map(|_| ())
    }

    pub async fn create_task(
        &self,
        schedule_id: ScheduleId,
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<Task> {
        let description = non_empty(description);
        validate_task_name(name)?;
        validate_task_description(description.as_deref())?;
        self.ensure_schedule(schedule_id).await?;

        let task = Task::new(schedule_id, name.trim(), description);
        self.tasks
            .create_task(&task)
            .await
            .storage_context("create task")?;
        Ok(task)
    }

    /// Create several `pending` tasks for one schedule.
    ///
    /// Input is validated up front. Rows are then written one by one; on a
    /// storage failure the rows already written are kept.
    pub async fn create_batch_tasks(
        &self,
        schedule_id: ScheduleId,
        new_tasks: Vec<NewTask>,
    ) -> ServiceResult<Vec<Task>> {
        if new_tasks.is_empty() {
            return Err(ServiceError::invalid("at least one task is required"));
        }
        for new_task in &new_tasks {
            validate_task_name(&new_task.name)?;
            validate_task_description(new_task.description.as_deref())?;
        }
        self.ensure_schedule(schedule_id).await?;

        let tasks: Vec<Task> = new_tasks
            .into_iter()
            .map(|t| Task::new(schedule_id, t.name.trim(), non_empty(t.description)))
            .collect();
        self.tasks
            .create_tasks_batch(&tasks)
            .await
            .storage_context("create batch tasks")?;
        info!("Created {} tasks for schedule {}", tasks.len(), schedule_id);
        Ok(tasks)
    }

    pub async fn get_task_by_id(&self, id: TaskId) -> ServiceResult<Task> {
        self.tasks.get_task(id).await.storage_context("get task")
    }

    pub async fn get_tasks_by_schedule_id(&self, schedule_id: ScheduleId) -> ServiceResult<Vec<Task>> {
        self.tasks
            .list_tasks_by_schedule(schedule_id)
            .await
            .storage_context("list tasks")
    }

    pub async fn get_tasks_by_status(&self, status: &str) -> ServiceResult<Vec<Task>> {
        let status: TaskStatus = status.parse()?;
        self.tasks
            .list_tasks_by_status(status)
            .await
            .storage_context("list tasks by status")
    }

    /// Set a task's status.
    ///
    /// `not_completed` requires a non-empty `reason`. `completed_at` follows
    /// the new status.
    pub async fn update_task_status(
        &self,
        id: TaskId,
        status: &str,
        reason: Option<String>,
    ) -> ServiceResult<Task> {
        let status: TaskStatus = status.parse()?;
        let change = TaskStatusChange::new(status, reason)?;
        let task = self
            .tasks
            .update_task_status(id, &change)
            .await
            .storage_context("update task status")?;
        info!("Task {} moved to {}", id, task.status);
        Ok(task)
    }

    /// Partial update. Absent or empty fields keep their stored value.
    pub async fn update_task(&self, id: TaskId, update: TaskUpdate) -> ServiceResult<Task> {
        let status = match non_empty(update.status) {
            Some(s) => Some(s.parse::<TaskStatus>()?),
            None => None,
        };
        let name = non_empty(update.name);
        if let Some(name) = &name {
            validate_task_name(name)?;
        }
        let description = non_empty(update.description);
        validate_task_description(description.as_deref())?;
        let reason = non_empty(update.reason);

        let mut task = self.tasks.get_task(id).await.storage_context("get task")?;
        if let Some(name) = name {
            task.name = name.trim().to_string();
        }
        if description.is_some() {
            task.description = description;
        }

        let now = Utc::now();
        match status {
            Some(status) => {
                let change = TaskStatusChange::new(status, reason.or(task.reason.clone()))?;
                task.apply_status(&change, now);
            }
            None => {
                if reason.is_some() {
                    task.reason = reason;
                }
                task.updated_at = now;
            }
        }

        self.tasks
            .update_task(&task)
            .await
            .storage_context("update task")?;
        Ok(task)
    }

    pub async fn update_task_reason(&self, id: TaskId, reason: &str) -> ServiceResult<()> {
        if reason.trim().is_empty() {
            return Err(ValidationError::new("reason", "reason cannot be empty").into());
        }
        self.tasks
            .update_task_reason(id, reason)
            .await
            .storage_context("update task reason")
    }

    pub async fn delete_task(&self, id: TaskId) -> ServiceResult<()> {
        self.tasks
            .delete_task(id)
            .await
            .storage_context("delete task")?;
        info!("Deleted task {}", id);
        Ok(())
    }

    /// Conflict when the task belongs to a schedule other than `schedule_id`.
    pub async fn validate_task_update(
        &self,
        task_id: TaskId,
        schedule_id: ScheduleId,
    ) -> ServiceResult<()> {
        let task = self.get_task_by_id(task_id).await?;
        if task.schedule_id != schedule_id {
            return Err(ServiceError::conflict(
                "task does not belong to the specified schedule",
            ));
        }
        Ok(())
    }

    /// Excuse every pending task of a schedule with the same reason.
    ///
    /// Returns how many tasks were updated. Stops at the first failure;
    /// tasks updated before it stay updated.
    pub async fn mark_pending_tasks_as_not_completed(
        &self,
        schedule_id: ScheduleId,
        reason: &str,
    ) -> ServiceResult<usize> {
        let change = TaskStatusChange::new(TaskStatus::NotCompleted, Some(reason.to_string()))?;
        let tasks = self.get_tasks_by_schedule_id(schedule_id).await?;

        let mut updated = 0;
        for task in tasks.iter().filter(|t| t.is_pending()) {
            self.tasks
                .update_task_status(task.id, &change)
                .await
                .storage_context(&format!("update task {}", task.id))?;
            updated += 1;
        }
        info!(
            "Marked {} pending tasks of schedule {} as not completed",
            updated, schedule_id
        );
        Ok(updated)
    }

    pub async fn generate_task_report(&self, schedule_id: ScheduleId) -> ServiceResult<TaskReport> {
        let schedule = self
            .schedules
            .get_schedule(schedule_id)
            .await
            .storage_context("get schedule")?;
        let tasks = self.get_tasks_by_schedule_id(schedule_id).await?;
        let stats = StatusCounts::from_tasks(&tasks);

        Ok(TaskReport {
            schedule_id: schedule.id,
            client_name: schedule.client_name,
            shift_time: schedule.shift_time,
            location: schedule.location,
            total_tasks: stats.total,
            completed: stats.completed,
            pending: stats.pending,
            not_completed: stats.not_completed,
            completion_rate: stats.completion_rate(),
            tasks,
            generated_at: Utc::now(),
        })
    }

    /// `not_completed` tasks carrying a reason, newest first.
    pub async fn get_tasks_requiring_attention(&self) -> ServiceResult<Vec<Task>> {
        self.tasks
            .list_incomplete_tasks_with_reason()
            .await
            .storage_context("list tasks requiring attention")
    }

    pub async fn get_task_stats_by_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> ServiceResult<StatusCounts> {
        self.tasks
            .task_stats_by_schedule(schedule_id)
            .await
            .storage_context("compute task stats")
    }

    pub async fn get_task_completion_rate(&self, schedule_id: ScheduleId) -> ServiceResult<f64> {
        self.tasks
            .task_completion_rate(schedule_id)
            .await
            .storage_context("compute task completion rate")
    }

    pub async fn get_overall_task_stats(&self) -> ServiceResult<StatusCounts> {
        self.tasks
            .overall_task_stats()
            .await
            .storage_context("compute overall task stats")
    }
}
