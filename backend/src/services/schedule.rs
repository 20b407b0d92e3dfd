//! Schedule listing, lookup, mutation and analytics.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use super::error::{ServiceError, ServiceResult, StorageContext};
use super::fallback::{self, Sourced};
use crate::db::repository::{ScheduleRepository, TaskRepository};
use crate::db::Repositories;
use crate::models::{
    Paginated, Schedule, ScheduleAnalytics, ScheduleId, ScheduleStatus, ScheduleWithDetails,
    StatusCounts, StatusSummary,
};
use crate::validation::{
    validate_client_name, validate_location, validate_pagination, validate_search_query,
    validate_shift_time, MAX_PAGE_LIMIT,
};

#[derive(Clone)]
pub struct ScheduleService {
    schedules: Arc<dyn ScheduleRepository>,
    tasks: Arc<dyn TaskRepository>,
    use_fallback_on_error: bool,
}

impl ScheduleService {
    pub fn new(repos: &Repositories, use_fallback_on_error: bool) -> Self {
        Self {
            schedules: Arc::clone(&repos.schedules),
            tasks: Arc::clone(&repos.tasks),
            use_fallback_on_error,
        }
    }

    /// Tag a live result, or swap a storage failure for fallback data when
    /// that is enabled. Every other error is returned unchanged.
    fn live_or_fallback<T>(
        &self,
        result: ServiceResult<T>,
        what: &str,
        fallback: impl FnOnce() -> ServiceResult<T>,
    ) -> ServiceResult<Sourced<T>> {
        match result {
            Ok(data) => Ok(Sourced::live(data)),
            Err(err) if self.use_fallback_on_error && err.is_storage_failure() => {
                warn!("Serving fallback data for {}: {}", what, err);
                fallback().map(Sourced::fallback)
            }
            Err(err) => Err(err),
        }
    }

    /// List schedules, newest first.
    ///
    /// An empty `status` means no filter.
    pub async fn get_schedules(
        &self,
        page: usize,
        limit: usize,
        status: &str,
    ) -> ServiceResult<Sourced<Paginated<Schedule>>> {
        validate_pagination(page, limit)?;
        let status = parse_status_filter(status)?;

        let result = self
            .schedules
            .list_schedules(page, limit, status)
            .await
            .storage_context("list schedules");
        self.live_or_fallback(result, "schedule list", || {
            let filtered = fallback::schedules()
                .into_iter()
                .filter(|s| status.map_or(true, |st| s.status == st))
                .collect();
            Ok(Paginated::from_ordered(filtered, page, limit))
        })
    }

    pub async fn get_today_schedules(&self) -> ServiceResult<Sourced<Vec<Schedule>>> {
        let result = self
            .schedules
            .list_today_schedules()
            .await
            .storage_context("list today's schedules");
        self.live_or_fallback(result, "today's schedules", || {
            Ok(fallback::today_schedules())
        })
    }

    /// Schedule with its visit and tasks.
    pub async fn get_schedule_by_id(
        &self,
        id: ScheduleId,
    ) -> ServiceResult<Sourced<ScheduleWithDetails>> {
        let result = self
            .schedules
            .get_schedule_with_details(id)
            .await
            .storage_context("get schedule details");
        self.live_or_fallback(result, "schedule details", || {
            fallback::schedule_details(id).ok_or_else(|| ServiceError::not_found("schedule", id))
        })
    }

    pub async fn search_schedules(
        &self,
        query: &str,
        page: usize,
        limit: usize,
    ) -> ServiceResult<Sourced<Paginated<Schedule>>> {
        validate_search_query(query)?;
        validate_pagination(page, limit)?;

        let result = self
            .schedules
            .search_schedules(query, page, limit)
            .await
            .storage_context("search schedules");
        self.live_or_fallback(result, "schedule search", || {
            let matches = fallback::schedules()
                .into_iter()
                .filter(|s| s.matches_query(query))
                .collect();
            Ok(Paginated::from_ordered(matches, page, limit))
        })
    }

    pub async fn get_stats(&self) -> ServiceResult<Sourced<StatusCounts>> {
        let result = self
            .schedules
            .schedule_stats()
            .await
            .storage_context("compute schedule stats");
        self.live_or_fallback(result, "schedule stats", || Ok(fallback::stats()))
    }

    pub async fn create_schedule(
        &self,
        client_name: &str,
        shift_time: &str,
        location: &str,
    ) -> ServiceResult<Schedule> {
        validate_client_name(client_name)?;
        validate_shift_time(shift_time)?;
        validate_location(location)?;

        let schedule = Schedule::new(client_name.trim(), shift_time, location.trim());
        self.schedules
            .create_schedule(&schedule)
            .await
            .storage_context("create schedule")?;
        info!("Created schedule {} for {}", schedule.id, schedule.client_name);
        Ok(schedule)
    }

    /// Replace the descriptive fields of a schedule.
    pub async fn update_schedule(
        &self,
        id: ScheduleId,
        client_name: &str,
        shift_time: &str,
        location: &str,
    ) -> ServiceResult<Schedule> {
        validate_client_name(client_name)?;
        validate_shift_time(shift_time)?;
        validate_location(location)?;

        let mut schedule = self
            .schedules
            .get_schedule(id)
            .await
            .storage_context("get schedule")?;
        schedule.client_name = client_name.trim().to_string();
        schedule.shift_time = shift_time.to_string();
        schedule.location = location.trim().to_string();
        schedule.updated_at = Utc::now();

        self.schedules
            .update_schedule(&schedule)
            .await
            .storage_context("update schedule")?;
        Ok(schedule)
    }

    pub async fn update_schedule_status(&self, id: ScheduleId, status: &str) -> ServiceResult<()> {
        let status: ScheduleStatus = status.parse()?;
        self.schedules
            .update_schedule_status(id, status)
            .await
            .storage_context("update schedule status")?;
        info!("Schedule {} moved to {}", id, status);
        Ok(())
    }

    /// Delete a schedule together with its visit and tasks.
    pub async fn delete_schedule(&self, id: ScheduleId) -> ServiceResult<()> {
        self.schedules
            .delete_schedule(id)
            .await
            .storage_context("delete schedule")?;
        info!("Deleted schedule {}", id);
        Ok(())
    }

    pub async fn get_schedule_analytics(&self, id: ScheduleId) -> ServiceResult<ScheduleAnalytics> {
        let details = self
            .schedules
            .get_schedule_with_details(id)
            .await
            .storage_context("get schedule details")?;
        let completion_rate = self
            .tasks
            .task_completion_rate(id)
            .await
            .storage_context("compute task completion rate")?;
        Ok(ScheduleAnalytics::new(&details, completion_rate))
    }

    /// First page (up to 100) of schedules in `status`, with global counters.
    pub async fn get_schedules_by_status(&self, status: &str) -> ServiceResult<StatusSummary> {
        let status = parse_status_filter(status)?;
        let page = self
            .schedules
            .list_schedules(1, MAX_PAGE_LIMIT, status)
            .await
            .storage_context("list schedules by status")?;
        let stats = self
            .schedules
            .schedule_stats()
            .await
            .storage_context("compute schedule stats")?;
        Ok(StatusSummary {
            schedules: page.items,
            stats,
        })
    }

    pub async fn health_check(&self) -> ServiceResult<bool> {
        self.schedules
            .health_check()
            .await
            .storage_context("check store health")
    }
}

fn parse_status_filter(status: &str) -> ServiceResult<Option<ScheduleStatus>> {
    if status.is_empty() {
        return Ok(None);
    }
    Ok(Some(status.parse()?))
}
