//! Visit lifecycle: `not_started -> in_progress -> completed`.
//!
//! Starting and ending a visit also moves the owning schedule, so both
//! writes go through one unit of work.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::info;

use super::error::{ServiceError, ServiceResult, StorageContext};
use crate::db::repository::{ScheduleRepository, TransactionalRepository, VisitRepository};
use crate::db::Repositories;
use crate::models::{
    Coordinates, DurationStats, ScheduleId, ScheduleStatus, StatusCounts, Visit, VisitId,
    VisitStatus,
};
use crate::validation::validate_coordinates;

/// How far in the past a check-in may be recorded, in minutes.
pub const START_TOLERANCE_MINUTES: i64 = 5;
/// How far in the future a check-out may be recorded, in minutes.
pub const END_TOLERANCE_MINUTES: i64 = 60;

#[derive(Clone)]
pub struct VisitService {
    schedules: Arc<dyn ScheduleRepository>,
    visits: Arc<dyn VisitRepository>,
    transactions: Arc<dyn TransactionalRepository>,
}

impl VisitService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            schedules: Arc::clone(&repos.schedules),
            visits: Arc::clone(&repos.visits),
            transactions: Arc::clone(&repos.transactions),
        }
    }

    /// Check in to a schedule.
    ///
    /// The schedule must exist and have no visit, and `start_time` may be at
    /// most five minutes in the past. The visit is created and the schedule
    /// moved to `in_progress` together.
    pub async fn start_visit(
        &self,
        schedule_id: ScheduleId,
        start_time: DateTime<Utc>,
        location: Coordinates,
    ) -> ServiceResult<Visit> {
        validate_coordinates("startLocation", location.latitude, location.longitude)?;

        self.schedules
            .get_schedule(schedule_id)
            .await
            .storage_context("get schedule")?;
        if self
            .visits
            .visit_exists_for_schedule(schedule_id)
            .await
            .storage_context("check visit existence")?
        {
            return Err(ServiceError::conflict(
                "visit already started for this schedule",
            ));
        }
        if start_time < Utc::now() - Duration::minutes(START_TOLERANCE_MINUTES) {
            return Err(ServiceError::invalid("start time cannot be in the past"));
        }

        let visit = Visit::begin(schedule_id, start_time, location);
        let mut uow = self
            .transactions
            .begin()
            .await
            .storage_context("begin visit start")?;
        if uow
            .visit_exists_for_schedule(schedule_id)
            .await
            .storage_context("check visit existence")?
        {
            return Err(ServiceError::conflict(
                "visit already started for this schedule",
            ));
        }
        uow.insert_visit(&visit)
            .await
            .storage_context("create visit")?;
        uow.update_schedule_status(schedule_id, ScheduleStatus::InProgress)
            .await
            .storage_context("update schedule status")?;
        uow.commit().storage_context("commit visit start")?;

        info!("Visit {} started for schedule {}", visit.id, schedule_id);
        Ok(visit)
    }

    /// Check out of a schedule's visit.
    ///
    /// `end_time` must not precede the check-in and may be at most one hour
    /// in the future. The visit and the schedule both become `completed`.
    pub async fn end_visit(
        &self,
        schedule_id: ScheduleId,
        end_time: DateTime<Utc>,
        location: Coordinates,
    ) -> ServiceResult<Visit> {
        validate_coordinates("endLocation", location.latitude, location.longitude)?;

        let visit = self
            .visits
            .get_visit_by_schedule(schedule_id)
            .await
            .storage_context("get visit")?;
        check_can_end(&visit, end_time)?;

        let mut uow = self
            .transactions
            .begin()
            .await
            .storage_context("begin visit end")?;
        let current = uow
            .visit_by_schedule_id(schedule_id)
            .await
            .storage_context("get visit")?;
        if current.is_completed() {
            return Err(ServiceError::conflict("visit is already completed"));
        }
        let ended = uow
            .end_visit(current.id, end_time, location)
            .await
            .storage_context("end visit")?;
        uow.update_schedule_status(schedule_id, ScheduleStatus::Completed)
            .await
            .storage_context("update schedule status")?;
        uow.commit().storage_context("commit visit end")?;

        info!(
            "Visit {} ended for schedule {} after {}",
            ended.id,
            schedule_id,
            Self::calculate_visit_duration(&ended)
        );
        Ok(ended)
    }

    /// Read-only check that a visit could be started now.
    pub async fn validate_start_visit(&self, schedule_id: ScheduleId) -> ServiceResult<()> {
        let schedule = self
            .schedules
            .get_schedule(schedule_id)
            .await
            .storage_context("get schedule")?;
        if self
            .visits
            .visit_exists_for_schedule(schedule_id)
            .await
            .storage_context("check visit existence")?
        {
            return Err(ServiceError::conflict(
                "visit already started for this schedule",
            ));
        }
        if schedule.status == ScheduleStatus::Completed {
            return Err(ServiceError::conflict("schedule is already completed"));
        }
        Ok(())
    }

    /// Human readable duration: `"In progress"`, `"{h}h {m}m"` or `"{m}m"`.
    pub fn calculate_visit_duration(visit: &Visit) -> String {
        let Some(end_time) = visit.end_time else {
            return "In progress".to_string();
        };
        let elapsed = end_time - visit.start_time;
        let hours = elapsed.num_hours();
        let minutes = elapsed.num_minutes() % 60;
        if hours > 0 {
            format!("{}h {}m", hours, minutes)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Pure consistency check of raw visit data.
    ///
    /// End coordinates are only checked when an end time is given.
    pub fn validate_visit_data(
        start_location: Coordinates,
        start_time: Option<DateTime<Utc>>,
        end_location: Coordinates,
        end_time: Option<DateTime<Utc>>,
    ) -> ServiceResult<()> {
        if !start_location.is_valid() {
            return Err(ServiceError::invalid("invalid start coordinates"));
        }
        if end_time.is_some() && !end_location.is_valid() {
            return Err(ServiceError::invalid("invalid end coordinates"));
        }
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end < start {
                return Err(ServiceError::invalid("end time must be after start time"));
            }
        }
        Ok(())
    }

    pub async fn get_visit_by_id(&self, id: VisitId) -> ServiceResult<Visit> {
        self.visits.get_visit(id).await.storage_context("get visit")
    }

    pub async fn get_visit_by_schedule_id(&self, schedule_id: ScheduleId) -> ServiceResult<Visit> {
        self.visits
            .get_visit_by_schedule(schedule_id)
            .await
            .storage_context("get visit")
    }

    /// Forward-only status change; a completed visit cannot be reopened.
    pub async fn update_visit_status(&self, id: VisitId, status: &str) -> ServiceResult<()> {
        let status: VisitStatus = status.parse()?;
        self.visits
            .update_visit_status(id, status)
            .await
            .storage_context("update visit status")
    }

    pub async fn get_visit_stats(&self) -> ServiceResult<StatusCounts> {
        self.visits
            .visit_stats()
            .await
            .storage_context("compute visit stats")
    }

    pub async fn get_visit_duration_stats(&self) -> ServiceResult<DurationStats> {
        self.visits
            .visit_duration_stats()
            .await
            .storage_context("compute visit duration stats")
    }

    pub async fn get_visits_by_status(&self, status: &str) -> ServiceResult<Vec<Visit>> {
        let status: VisitStatus = status.parse()?;
        self.visits
            .list_visits_by_status(status)
            .await
            .storage_context("list visits by status")
    }

    pub async fn get_active_visits(&self) -> ServiceResult<Vec<Visit>> {
        self.visits
            .list_visits_by_status(VisitStatus::InProgress)
            .await
            .storage_context("list active visits")
    }

    /// Mean duration of completed visits in whole minutes, `None` when no
    /// visit has ended yet.
    pub async fn get_average_visit_duration(&self) -> ServiceResult<Option<Duration>> {
        let stats = self.get_visit_duration_stats().await?;
        if stats.total_completed == 0 {
            return Ok(None);
        }
        Ok(Some(Duration::minutes(stats.avg_duration as i64)))
    }

    /// Latest visit of a schedule with its duration re-derived.
    pub async fn get_visit_summary(&self, schedule_id: ScheduleId) -> ServiceResult<Visit> {
        let mut visit = self.get_visit_by_schedule_id(schedule_id).await?;
        visit.recompute_duration();
        Ok(visit)
    }
}

fn check_can_end(visit: &Visit, end_time: DateTime<Utc>) -> ServiceResult<()> {
    if visit.is_completed() {
        return Err(ServiceError::conflict("visit is already completed"));
    }
    if end_time < visit.start_time {
        return Err(ServiceError::invalid("end time must be after start time"));
    }
    if end_time > Utc::now() + Duration::minutes(END_TOLERANCE_MINUTES) {
        return Err(ServiceError::invalid(
            "end time cannot be more than 1 hour in the future",
        ));
    }
    Ok(())
}
