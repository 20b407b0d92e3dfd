//! Schedule aggregate root and its composite views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ScheduleId, ScheduleStatus, Task, Visit, VisitId};

/// A planned caregiver shift for a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub client_name: String,
    /// Shift window in `HH:MM-HH:MM` form.
    pub shift_time: String,
    pub location: String,
    pub status: ScheduleStatus,
    pub visit_id: Option<VisitId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Create a new schedule in the `upcoming` state with a fresh identity.
    pub fn new(
        client_name: impl Into<String>,
        shift_time: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ScheduleId::generate(),
            client_name: client_name.into(),
            shift_time: shift_time.into(),
            location: location.into(),
            status: ScheduleStatus::Upcoming,
            visit_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive substring match on client name or location.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.client_name.to_lowercase().contains(&needle)
            || self.location.to_lowercase().contains(&needle)
    }
}

/// A schedule together with its visit (if any) and its tasks.
///
/// Tasks are ordered by creation time, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWithDetails {
    #[serde(flatten)]
    pub schedule: Schedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit: Option<Visit>,
    pub tasks: Vec<Task>,
}
