//! Aggregated views: status counters, duration statistics and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Coordinates, Schedule, ScheduleId, ScheduleStatus, ScheduleWithDetails, Task, TaskStatus,
    Visit, VisitId, VisitStatus,
};

/// Four-bucket status counter shared by schedules, visits and tasks.
///
/// How a domain's statuses map onto `completed`, `pending` and
/// `not_completed` is decided by the store producing the counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub not_completed: usize,
}

impl StatusCounts {
    /// Count tasks by their own status.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            counts.total += 1;
            match task.status {
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::NotCompleted => counts.not_completed += 1,
            }
        }
        counts
    }

    /// `completed / total * 100`, or `0.0` when there is nothing to count.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Aggregate over every visit with a known duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationStats {
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub total_completed: usize,
}

impl DurationStats {
    pub fn from_minutes(durations: impl IntoIterator<Item = i64>) -> Self {
        let mut stats = Self::default();
        let mut sum = 0i64;
        for minutes in durations {
            let value = minutes as f64;
            if stats.total_completed == 0 {
                stats.min_duration = value;
                stats.max_duration = value;
            } else {
                stats.min_duration = stats.min_duration.min(value);
                stats.max_duration = stats.max_duration.max(value);
            }
            sum += minutes;
            stats.total_completed += 1;
        }
        if stats.total_completed > 0 {
            stats.avg_duration = sum as f64 / stats.total_completed as f64;
        }
        stats
    }
}

/// Visit part of a [`ScheduleAnalytics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitAnalytics {
    pub visit_id: VisitId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: VisitStatus,
    pub duration: Option<i64>,
    pub start_location: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Coordinates>,
}

impl From<&Visit> for VisitAnalytics {
    fn from(visit: &Visit) -> Self {
        Self {
            visit_id: visit.id,
            start_time: visit.start_time,
            end_time: visit.end_time,
            status: visit.status,
            duration: visit.duration_minutes(),
            start_location: visit.start_location(),
            end_location: visit.end_location(),
        }
    }
}

/// Per-schedule summary of task progress and the visit, if one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAnalytics {
    pub schedule_id: ScheduleId,
    pub client_name: String,
    pub shift_time: String,
    pub location: String,
    pub status: ScheduleStatus,
    pub task_completion_rate: f64,
    pub task_stats: StatusCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit: Option<VisitAnalytics>,
}

impl ScheduleAnalytics {
    pub fn new(details: &ScheduleWithDetails, task_completion_rate: f64) -> Self {
        let schedule = &details.schedule;
        Self {
            schedule_id: schedule.id,
            client_name: schedule.client_name.clone(),
            shift_time: schedule.shift_time.clone(),
            location: schedule.location.clone(),
            status: schedule.status,
            task_completion_rate,
            task_stats: StatusCounts::from_tasks(&details.tasks),
            visit: details.visit.as_ref().map(VisitAnalytics::from),
        }
    }
}

/// Snapshot of a schedule's tasks, stamped with the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub schedule_id: ScheduleId,
    pub client_name: String,
    pub shift_time: String,
    pub location: String,
    pub total_tasks: usize,
    pub completed: usize,
    pub pending: usize,
    pub not_completed: usize,
    pub completion_rate: f64,
    pub tasks: Vec<Task>,
    pub generated_at: DateTime<Utc>,
}

/// Schedules in one status together with the global schedule counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub schedules: Vec<Schedule>,
    pub stats: StatusCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate_is_zero_without_tasks() {
        assert_eq!(StatusCounts::default().completion_rate(), 0.0);
    }

    #[test]
    fn test_counts_from_tasks() {
        let schedule_id = ScheduleId::generate();
        let mut done = Task::new(schedule_id, "Medication", None);
        done.status = TaskStatus::Completed;
        let pending = Task::new(schedule_id, "Meal prep", None);
        let mut skipped = Task::new(schedule_id, "Walk", None);
        skipped.status = TaskStatus::NotCompleted;
        let tasks = vec![done, pending, skipped, Task::new(schedule_id, "Bath", None)];

        let counts = StatusCounts::from_tasks(&tasks);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.not_completed, 1);
        assert_eq!(counts.completion_rate(), 25.0);
    }

    #[test]
    fn test_duration_stats() {
        let empty = DurationStats::from_minutes(Vec::new());
        assert_eq!(empty, DurationStats::default());

        let stats = DurationStats::from_minutes(vec![30, 60, 90]);
        assert_eq!(stats.total_completed, 3);
        assert_eq!(stats.avg_duration, 60.0);
        assert_eq!(stats.min_duration, 30.0);
        assert_eq!(stats.max_duration, 90.0);
    }
}
