//! Task: a discrete care action attached to a schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ScheduleId, TaskId, TaskStatus};
use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub schedule_id: ScheduleId,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a `pending` task with a fresh identity.
    pub fn new(schedule_id: ScheduleId, name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            schedule_id,
            name: name.into(),
            description,
            status: TaskStatus::Pending,
            reason: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated status change.
    ///
    /// `completed_at` is stamped with `now` for `completed` and cleared for
    /// every other status. The reason is replaced by the one carried by the
    /// change (possibly `None`).
    pub fn apply_status(&mut self, change: &TaskStatusChange, now: DateTime<Utc>) {
        self.status = change.status;
        self.reason = change.reason.clone();
        self.completed_at = match change.status {
            TaskStatus::Completed => Some(now),
            _ => None,
        };
        self.updated_at = now;
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_not_completed(&self) -> bool {
        self.status == TaskStatus::NotCompleted
    }

    /// A non-empty reason is recorded on this task.
    pub fn has_reason(&self) -> bool {
        self.reason.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

/// A requested task status together with its reason.
///
/// The only way to build one is [`TaskStatusChange::new`], which refuses
/// `not_completed` without a non-empty reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusChange {
    status: TaskStatus,
    reason: Option<String>,
}

impl TaskStatusChange {
    pub fn new(status: TaskStatus, reason: Option<String>) -> Result<Self, ValidationError> {
        let has_reason = reason.as_deref().is_some_and(|r| !r.trim().is_empty());
        if status == TaskStatus::NotCompleted && !has_reason {
            return Err(ValidationError::new(
                "reason",
                "reason is required for not_completed tasks",
            ));
        }
        Ok(Self { status, reason })
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Input for creating a task; the schedule is supplied separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a task. `None` and empty strings leave a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}
