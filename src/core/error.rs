use thiserror::Error;

/// Centralized error types for the application
///
/// Storage failures (`Database`, `DatabasePool`, `Migration`) are the only fatal
/// category: they are propagated to the dispatcher and logged there. The
/// remaining variants are expected outcomes that handlers turn into replies.
///
/// # Example
///
/// ```no_run
/// use filelink_bot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(String),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// No file is registered under the given code
    #[error("File not found: {0}")]
    NotFound(String),

    /// A non-admin tried to run an admin-only action
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed user id, month count or credit value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Free-tier upload over today's limit
    #[error("Daily quota exceeded ({used}/{limit})")]
    QuotaExceeded { used: i64, limit: i64 },

    /// Every generated code collided with an existing one
    #[error("Could not allocate a unique file code after {0} attempts")]
    CodeCollision(u32),
}

impl AppError {
    /// Returns true for errors that mean the persistence layer is unusable.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::DatabasePool(_) | AppError::Migration(_)
        )
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
