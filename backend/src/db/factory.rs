//! Repository factory for dependency injection.
//!
//! This module turns runtime configuration into a [`Repositories`] bundle.

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
use super::repository::{RepositoryError, RepositoryResult};
use super::Repositories;
use crate::config::RepositorySettings;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("local", "memory")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" | "in-memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use evv_backend::db::{RepositoryFactory, RepositoryType};
///
/// let repos = RepositoryFactory::create(RepositoryType::Local);
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository bundle based on type.
    pub fn create(repo_type: RepositoryType) -> Repositories {
        match repo_type {
            RepositoryType::Local => Self::create_local(),
        }
    }

    /// Create a bundle backed by a fresh in-memory local repository.
    pub fn create_local() -> Repositories {
        Repositories::from_store(Arc::new(LocalRepository::new()))
    }

    /// Create a repository bundle from the `[repository]` configuration table.
    ///
    /// # Returns
    /// * `Ok(Repositories)` - Repository bundle
    /// * `Err(RepositoryError::Configuration)` - If the type is unknown
    pub fn from_settings(settings: &RepositorySettings) -> RepositoryResult<Repositories> {
        let repo_type = settings.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Ok(Self::create(repo_type))
    }
}
