//! Multi-entity writes that must land together.
//!
//! A [`UnitOfWork`] stages writes against schedules and visits. Nothing is
//! visible to other callers until [`UnitOfWork::commit`] succeeds; dropping
//! the unit of work without committing discards every staged write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{Coordinates, ScheduleId, ScheduleStatus, Visit, VisitId};

#[async_trait]
pub trait UnitOfWork: Send {
    async fn visit_exists_for_schedule(&mut self, schedule_id: ScheduleId)
        -> RepositoryResult<bool>;

    /// Most recently created visit of a schedule, as seen by this unit of work.
    async fn visit_by_schedule_id(&mut self, schedule_id: ScheduleId) -> RepositoryResult<Visit>;

    /// Stage a new visit. Fails with a constraint violation if the schedule
    /// already has one.
    async fn insert_visit(&mut self, visit: &Visit) -> RepositoryResult<()>;

    async fn end_visit(
        &mut self,
        id: VisitId,
        end_time: DateTime<Utc>,
        location: Coordinates,
    ) -> RepositoryResult<Visit>;

    async fn update_schedule_status(
        &mut self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> RepositoryResult<()>;

    /// Publish every staged write. On failure nothing staged becomes visible
    /// and the error is `RepositoryError::Transaction`.
    fn commit(self: Box<Self>) -> RepositoryResult<()>;
}

/// Stores able to open a [`UnitOfWork`].
#[async_trait]
pub trait TransactionalRepository: Send + Sync {
    async fn begin(&self) -> RepositoryResult<Box<dyn UnitOfWork>>;
}
