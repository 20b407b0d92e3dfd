//! Visit repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{
    Coordinates, DurationStats, ScheduleId, StatusCounts, Visit, VisitId, VisitStatus,
};

/// Repository trait for visits.
///
/// A schedule has at most one visit; inserting a second one fails with
/// `RepositoryError::Constraint`.
#[async_trait]
pub trait VisitRepository: Send + Sync {
    async fn get_visit(&self, id: VisitId) -> RepositoryResult<Visit>;

    /// Most recently created visit of a schedule.
    async fn get_visit_by_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<Visit>;

    /// Persist a visit and link it from its schedule.
    async fn create_visit(&self, visit: &Visit) -> RepositoryResult<()>;

    /// Open a new `in_progress` visit for a schedule.
    ///
    /// # Arguments
    /// * `schedule_id` - Schedule being visited
    /// * `start_time` - Check-in time
    /// * `location` - Check-in coordinates
    ///
    /// # Returns
    /// * `Ok(Visit)` - The stored visit with a fresh ID
    async fn start_visit(
        &self,
        schedule_id: ScheduleId,
        start_time: DateTime<Utc>,
        location: Coordinates,
    ) -> RepositoryResult<Visit>;

    /// Close a visit. The returned record carries the derived duration.
    async fn end_visit(
        &self,
        id: VisitId,
        end_time: DateTime<Utc>,
        location: Coordinates,
    ) -> RepositoryResult<Visit>;

    /// Move a visit to `status`. Backward moves, any change to a completed
    /// visit and completing a visit that has no end time are constraint
    /// violations.
    async fn update_visit_status(&self, id: VisitId, status: VisitStatus) -> RepositoryResult<()>;

    async fn visit_exists_for_schedule(&self, schedule_id: ScheduleId) -> RepositoryResult<bool>;

    /// Global counters: completed, pending (`in_progress`) and not completed
    /// (`not_started`).
    async fn visit_stats(&self) -> RepositoryResult<StatusCounts>;

    /// Min/max/avg over every visit with a known duration.
    async fn visit_duration_stats(&self) -> RepositoryResult<DurationStats>;

    /// Visits in `status`, newest first.
    async fn list_visits_by_status(&self, status: VisitStatus) -> RepositoryResult<Vec<Visit>>;
}
