//! Database error type and constraint classification

use crate::models::ValidationError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Unique constraint hit (duplicate email, duplicate participation)
    #[error("{message}")]
    Conflict { message: &'static str },

    /// Row failed domain validation (e.g. merged schedule window out of order)
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Which constraint a failed write tripped over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
    Check,
}

/// Classify a write error by constraint kind, returning the constraint name.
pub(crate) fn violation(err: &sqlx::Error) -> Option<(Violation, Option<String>)> {
    let db_err = err.as_database_error()?;
    let constraint = db_err.constraint().map(str::to_owned);

    if db_err.is_unique_violation() {
        Some((Violation::Unique, constraint))
    } else if db_err.is_foreign_key_violation() {
        Some((Violation::ForeignKey, constraint))
    } else if db_err.is_check_violation() {
        Some((Violation::Check, constraint))
    } else {
        None
    }
}
