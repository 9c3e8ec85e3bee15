use crate::telemetry::error_chain_fmt;

/// Failure taxonomy for the query/retrieval core.
///
/// `Validation` is raised at the boundary (descriptor normalization, input
/// parsing), so store operations can assume well-formed input; `Store` wraps
/// any persistence failure not classified as one of the other variants.
#[derive(thiserror::Error)]
pub enum BlogError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("A database error was encountered.")]
    Store(#[from] sqlx::Error),
}

impl std::fmt::Debug for BlogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl BlogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Classify a write failure: unique violations become `Conflict` with the
    /// given message, foreign key violations become `Validation`, everything
    /// else stays a `Store` error.
    pub fn from_write_error(e: sqlx::Error, conflict_message: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_error) = &e {
            if db_error.is_unique_violation() {
                return Self::Conflict(conflict_message.into());
            }
            if db_error.is_foreign_key_violation() {
                return Self::Validation(
                    "One of the referenced records does not exist.".to_string(),
                );
            }
        }
        Self::Store(e)
    }
}
