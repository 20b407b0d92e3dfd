//! Data-access layer for schedules, visits and tasks.
//!
//! This module provides abstractions for storage via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API)                           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (crate::services) - Business Rules       │
//! │  - Visit lifecycle and unit of work orchestration        │
//! │  - Task status rules                                     │
//! │  - Fallback data                                         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! Stores never call each other; only services coordinate across entities.

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;

use std::sync::Arc;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
pub use repository::{
    ErrorContext, FullRepository, RepositoryError, RepositoryResult, ScheduleRepository,
    TaskRepository, TransactionalRepository, UnitOfWork, VisitRepository,
};

/// One handle per repository trait, all usually backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub schedules: Arc<dyn ScheduleRepository>,
    pub visits: Arc<dyn VisitRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub transactions: Arc<dyn TransactionalRepository>,
}

impl Repositories {
    /// Share a single store across every repository handle.
    pub fn from_store<R>(store: Arc<R>) -> Self
    where
        R: FullRepository + 'static,
    {
        Self {
            schedules: store.clone(),
            visits: store.clone(),
            tasks: store.clone(),
            transactions: store,
        }
    }
}
