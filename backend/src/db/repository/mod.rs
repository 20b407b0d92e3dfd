//! Repository traits for the data-access layer.
//!
//! One trait per entity plus [`TransactionalRepository`] for writes that span
//! schedules and visits. Services depend on [`FullRepository`], which every
//! type implementing all four traits gets for free.

pub mod error;
pub mod schedule;
pub mod task;
pub mod unit_of_work;
pub mod visit;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use schedule::ScheduleRepository;
pub use task::TaskRepository;
pub use unit_of_work::{TransactionalRepository, UnitOfWork};
pub use visit::VisitRepository;

/// Every repository capability the service layer needs.
pub trait FullRepository:
    ScheduleRepository + VisitRepository + TaskRepository + TransactionalRepository
{
}

impl<T> FullRepository for T where
    T: ScheduleRepository + VisitRepository + TaskRepository + TransactionalRepository
{
}
