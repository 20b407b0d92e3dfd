//! Error types for repository operations.
//!
//! Every variant carries an [`ErrorContext`] naming the operation and the
//! record involved, so the service layer can translate failures without
//! inspecting message text.

use std::fmt;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a repository failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Store operation, e.g. `"end_visit"`.
    pub operation: Option<String>,
    /// Entity kind: `"schedule"`, `"visit"` or `"task"`.
    pub entity: Option<String>,
    pub entity_id: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.operation.as_deref().unwrap_or("unknown");
        match (&self.entity, &self.entity_id) {
            (Some(entity), Some(id)) => write!(f, "(in {}, {} {})", op, entity, id),
            (Some(entity), None) => write!(f, "(in {}, {})", op, entity),
            _ => write!(f, "(in {})", op),
        }
    }
}

/// Error type for repository operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    /// The store cannot be reached. Transient.
    #[error("Store unavailable: {message} {context}")]
    Unavailable {
        message: String,
        context: ErrorContext,
    },

    /// A single read or write failed.
    #[error("Query error: {message} {context}")]
    Query {
        message: String,
        context: ErrorContext,
    },

    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A uniqueness or referential rule of the store was violated.
    #[error("Constraint violation: {message} {context}")]
    Constraint {
        message: String,
        context: ErrorContext,
    },

    /// A unit of work could not be committed; none of its writes are visible.
    #[error("Transaction error: {message} {context}")]
    Transaction {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl RepositoryError {
    pub fn unavailable(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Unavailable {
            message: message.into(),
            context,
        }
    }

    pub fn query(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Query {
            message: message.into(),
            context,
        }
    }

    pub fn not_found(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn constraint(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Constraint {
            message: message.into(),
            context,
        }
    }

    pub fn transaction(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Transaction {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Unavailable stores and failed commits may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Transaction { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }

    /// Context of the failure; `None` for configuration errors.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Unavailable { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Constraint { context, .. }
            | Self::Transaction { context, .. } => Some(context),
            Self::Configuration { .. } => None,
        }
    }
}
