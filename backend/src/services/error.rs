//! Domain-level failures returned by every service operation.

use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::UnknownStatus;
use crate::validation::ValidationError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("failed to {context}: {source}")]
    StorageFailure {
        context: String,
        #[source]
        source: RepositoryError,
    },
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Translate a store failure.
    ///
    /// NotFound keeps its entity and id, a constraint violation becomes a
    /// conflict and anything else is a storage failure described by `context`.
    pub fn from_repository(context: impl Into<String>, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { context: ctx, .. } => Self::NotFound {
                entity: ctx.entity.unwrap_or_else(|| "record".to_string()),
                id: ctx.entity_id.unwrap_or_default(),
            },
            RepositoryError::Constraint { message, .. } => Self::Conflict(message),
            other => Self::StorageFailure {
                context: context.into(),
                source: other,
            },
        }
    }

    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailure { .. })
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<UnknownStatus> for ServiceError {
    fn from(err: UnknownStatus) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Attach a description of the failed step to a repository result.
pub(crate) trait StorageContext<T> {
    fn storage_context(self, context: &str) -> ServiceResult<T>;
}

impl<T> StorageContext<T> for RepositoryResult<T> {
    fn storage_context(self, context: &str) -> ServiceResult<T> {
        self.map_err(|err| ServiceError::from_repository(context, err))
    }
}
