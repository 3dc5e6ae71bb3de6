//! Store-level error type and sqlx error classification.

use workplan_core::error::CoreError;
use workplan_core::validate::{Violation, Violations};

/// Error type returned by all repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level failure (not found, validation, conflict, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for repository return values.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Wrap a non-empty violation list produced by the validation layer.
    pub fn validation(violations: Vec<Violation>) -> Self {
        StoreError::Core(CoreError::Validation(Violations(violations)))
    }

    /// The full violation list, when this is a validation failure.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            StoreError::Core(CoreError::Validation(violations)) => Some(violations),
            _ => None,
        }
    }

    /// Whether this is a unique-index violation on the named constraint.
    ///
    /// PostgreSQL reports unique violations as error code 23505; the
    /// constraint name tells us which uniqueness rule lost the race.
    pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
        match err {
            sqlx::Error::Database(db_err) => {
                db_err.code().as_deref() == Some("23505")
                    && db_err.constraint() == Some(constraint)
            }
            _ => false,
        }
    }
}
