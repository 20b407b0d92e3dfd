//! Fixed demonstration dataset served when the store is unavailable and
//! `use_fallback_on_error` is enabled.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Schedule, ScheduleId, ScheduleStatus, ScheduleWithDetails, StatusCounts, Task, TaskId,
    TaskStatus,
};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Live,
    Fallback,
}

/// A result tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Live,
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == DataOrigin::Fallback
    }
}

pub const FIRST_SCHEDULE_ID: ScheduleId = ScheduleId(Uuid::from_u128(1));
pub const SECOND_SCHEDULE_ID: ScheduleId = ScheduleId(Uuid::from_u128(2));

fn schedule(
    id: ScheduleId,
    client_name: &str,
    shift_time: &str,
    location: &str,
    status: ScheduleStatus,
) -> Schedule {
    let mut schedule = Schedule::new(client_name, shift_time, location);
    schedule.id = id;
    schedule.status = status;
    schedule
}

pub fn schedules() -> Vec<Schedule> {
    vec![
        schedule(
            FIRST_SCHEDULE_ID,
            "John Smith",
            "09:00-12:00",
            "123 Main St, Anytown",
            ScheduleStatus::Upcoming,
        ),
        schedule(
            SECOND_SCHEDULE_ID,
            "Jane Doe",
            "10:00-14:00",
            "456 Oak Ave, Somewhere",
            ScheduleStatus::InProgress,
        ),
    ]
}

pub fn today_schedules() -> Vec<Schedule> {
    schedules()
        .into_iter()
        .filter(|s| s.id == SECOND_SCHEDULE_ID)
        .collect()
}

/// Details for one of the fallback schedules, if `id` is one of them.
pub fn schedule_details(id: ScheduleId) -> Option<ScheduleWithDetails> {
    let schedule = schedules().into_iter().find(|s| s.id == id)?;
    let tasks = if id == FIRST_SCHEDULE_ID {
        let now = Utc::now();
        let mut medication = Task::new(
            id,
            "Morning Medication",
            Some("Administer morning medication".to_string()),
        );
        medication.id = TaskId(Uuid::from_u128(101));
        medication.status = TaskStatus::Completed;
        medication.reason = Some("Administered as prescribed".to_string());
        medication.completed_at = Some(now);

        let mut vitals = Task::new(
            id,
            "Vital Signs Check",
            Some("Check blood pressure and temperature".to_string()),
        );
        vitals.id = TaskId(Uuid::from_u128(102));
        vec![medication, vitals]
    } else {
        Vec::new()
    };

    Some(ScheduleWithDetails {
        schedule,
        visit: None,
        tasks,
    })
}

pub fn stats() -> StatusCounts {
    StatusCounts {
        total: 8,
        completed: 4,
        pending: 3,
        not_completed: 1,
    }
}
