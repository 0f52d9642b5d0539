// Central Error Type for the Application

use thiserror::Error;

/// Message carried by every gateway call when no store is configured
pub const DATABASE_NOT_CONFIGURED: &str = "Database not configured";

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_configured() -> Self {
        AppError::Config(DATABASE_NOT_CONFIGURED.to_string())
    }

    /// Conflict-class errors: a guarded update matched zero rows
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_) | AppError::InvalidState(_))
            || matches!(
                self,
                AppError::Domain(crate::domain::DomainError::InvalidStateTransition { .. })
            )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
