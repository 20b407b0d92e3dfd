//! Schedule repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    Paginated, Schedule, ScheduleId, ScheduleStatus, ScheduleWithDetails, StatusCounts,
};

/// Repository trait for schedules, the aggregate root of the domain.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Check if the store is reachable and healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// List schedules, newest first.
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    /// * `limit` - Page size
    /// * `status` - Only return schedules in this status, if given
    async fn list_schedules(
        &self,
        page: usize,
        limit: usize,
        status: Option<ScheduleStatus>,
    ) -> RepositoryResult<Paginated<Schedule>>;

    /// Schedules created on the current UTC date, ordered by shift time.
    async fn list_today_schedules(&self) -> RepositoryResult<Vec<Schedule>>;

    /// Fetch a schedule by ID.
    ///
    /// # Returns
    /// * `Ok(Schedule)` - The schedule
    /// * `Err(RepositoryError::NotFound)` - If no schedule has this ID
    async fn get_schedule(&self, id: ScheduleId) -> RepositoryResult<Schedule>;

    /// Fetch a schedule together with its visit and its tasks (oldest first).
    async fn get_schedule_with_details(
        &self,
        id: ScheduleId,
    ) -> RepositoryResult<ScheduleWithDetails>;

    async fn create_schedule(&self, schedule: &Schedule) -> RepositoryResult<()>;

    /// Replace a stored schedule. Fails with NotFound if it does not exist.
    async fn update_schedule(&self, schedule: &Schedule) -> RepositoryResult<()>;

    async fn update_schedule_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<()>;

    /// Delete a schedule together with its visit and tasks.
    async fn delete_schedule(&self, id: ScheduleId) -> RepositoryResult<()>;

    /// Global counters: completed, pending (`upcoming` + `in_progress`) and
    /// not completed (`missed`).
    async fn schedule_stats(&self) -> RepositoryResult<StatusCounts>;

    /// Case-insensitive substring search on client name or location,
    /// newest first.
    async fn search_schedules(
        &self,
        query: &str,
        page: usize,
        limit: usize,
    ) -> RepositoryResult<Paginated<Schedule>>;
}
