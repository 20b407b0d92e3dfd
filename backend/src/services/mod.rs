//! Domain services.
//!
//! Services validate input, call one or more repositories and enforce the
//! rules that span schedules, visits and tasks. They are cheap `Clone`
//! handles with no mutable state of their own.

pub mod error;
pub mod fallback;
pub mod schedule;
pub mod task;
pub mod visit;

pub use error::{ServiceError, ServiceResult};
pub use fallback::{DataOrigin, Sourced};
pub use schedule::ScheduleService;
pub use task::TaskService;
pub use visit::VisitService;

use crate::config::ServiceSettings;
use crate::db::Repositories;

/// Every service, built over one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub schedules: ScheduleService,
    pub visits: VisitService,
    pub tasks: TaskService,
}

impl Services {
    pub fn new(repos: &Repositories, settings: &ServiceSettings) -> Self {
        Self {
            schedules: ScheduleService::new(repos, settings.use_fallback_on_error),
            visits: VisitService::new(repos),
            tasks: TaskService::new(repos),
        }
    }
}
