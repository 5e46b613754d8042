//! Service error taxonomy.
//!
//! Every failure falls into one [`ErrorCategory`]; duplicate adds and
//! removes of absent entries are successes, not errors.

use crate::model::validation::ValidationError;
use crate::repo::error::{EntityKind, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    ValidationFailed,
    Conflict,
    Timeout,
    Storage,
}

impl ErrorCategory {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Conflict => "CONFLICT",
            Self::Timeout => "TIMEOUT",
            Self::Storage => "STORAGE",
        }
    }
}

/// Service error for god/abode/emblem use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Missing or malformed input.
    Validation(ValidationError),
    /// Referenced id has no record.
    NotFound { entity: EntityKind, id: Uuid },
    /// Optimistic write lost against a concurrent writer.
    VersionConflict {
        id: Uuid,
        expected: i64,
        actual: i64,
    },
    /// Storage did not answer within the busy timeout.
    Timeout,
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::ValidationFailed,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::VersionConflict { .. } => ErrorCategory::Conflict,
            Self::Timeout => ErrorCategory::Timeout,
            Self::InconsistentState(_) | Self::Repo(_) => ErrorCategory::Storage,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::VersionConflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "version conflict on {id}: expected {expected}, stored {actual}"
            ),
            Self::Timeout => write!(f, "storage timed out"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::VersionConflict {
                id,
                expected,
                actual,
            } => Self::VersionConflict {
                id,
                expected,
                actual,
            },
            RepoError::Timeout => Self::Timeout,
            other => Self::Repo(other),
        }
    }
}
