use thiserror::Error;

/// Storage-specific error types for the rental data-access layer.
///
/// Missing rows are not errors: lookups return `Ok(None)` and deletes
/// return `Ok(false)`. Only store failures, invalid domain values and
/// configuration problems surface here.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A value violated a domain rule (date order, rating range, ...)
    #[error("Domain error: {0}")]
    Domain(#[from] insight_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
