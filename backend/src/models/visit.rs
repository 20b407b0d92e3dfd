//! Visit: the geolocated record of when care actually started and ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ScheduleId, VisitId, VisitStatus};
use crate::validation::is_valid_coordinates;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_coordinates(self.latitude, self.longitude)
    }
}

/// Check-in/check-out record for a schedule.
///
/// `duration_minutes` is derived from the start and end times and cannot be
/// set from outside this module. It is serialized but never read back: a
/// deserialized visit re-derives it from its timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "VisitFields")]
pub struct Visit {
    pub id: VisitId,
    pub schedule_id: ScheduleId,
    pub start_time: DateTime<Utc>,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_time: Option<DateTime<Utc>>,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub status: VisitStatus,
    duration_minutes: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a [`Visit`] without its derived duration.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisitFields {
    id: VisitId,
    schedule_id: ScheduleId,
    start_time: DateTime<Utc>,
    start_latitude: f64,
    start_longitude: f64,
    end_time: Option<DateTime<Utc>>,
    end_latitude: Option<f64>,
    end_longitude: Option<f64>,
    status: VisitStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VisitFields> for Visit {
    fn from(fields: VisitFields) -> Self {
        let mut visit = Visit {
            id: fields.id,
            schedule_id: fields.schedule_id,
            start_time: fields.start_time,
            start_latitude: fields.start_latitude,
            start_longitude: fields.start_longitude,
            end_time: fields.end_time,
            end_latitude: fields.end_latitude,
            end_longitude: fields.end_longitude,
            status: fields.status,
            duration_minutes: None,
            created_at: fields.created_at,
            updated_at: fields.updated_at,
        };
        visit.recompute_duration();
        visit
    }
}

impl Visit {
    /// Open a visit for `schedule_id` in the `in_progress` state.
    pub fn begin(schedule_id: ScheduleId, start_time: DateTime<Utc>, location: Coordinates) -> Self {
        let now = Utc::now();
        Self {
            id: VisitId::generate(),
            schedule_id,
            start_time,
            start_latitude: location.latitude,
            start_longitude: location.longitude,
            end_time: None,
            end_latitude: None,
            end_longitude: None,
            status: VisitStatus::InProgress,
            duration_minutes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record check-out and move the visit to `completed`.
    pub fn finish(&mut self, end_time: DateTime<Utc>, location: Coordinates) {
        self.end_time = Some(end_time);
        self.end_latitude = Some(location.latitude);
        self.end_longitude = Some(location.longitude);
        self.status = VisitStatus::Completed;
        self.updated_at = Utc::now();
        self.recompute_duration();
    }

    pub fn start_location(&self) -> Coordinates {
        Coordinates::new(self.start_latitude, self.start_longitude)
    }

    pub fn end_location(&self) -> Option<Coordinates> {
        match (self.end_latitude, self.end_longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    /// Whole minutes between start and end, if the visit has ended.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.duration_minutes
    }

    /// Re-derive the duration from the timestamps currently on the record.
    pub fn recompute_duration(&mut self) {
        self.duration_minutes = self
            .end_time
            .map(|end| (end - self.start_time).num_minutes());
    }

    pub fn is_completed(&self) -> bool {
        self.status == VisitStatus::Completed
    }
}
