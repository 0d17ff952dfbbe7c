//! Service error taxonomy.
//!
//! Three classes of failure reach callers:
//! - validation: the input was rejected locally, nothing was sent anywhere;
//! - rejection: the store or bucket refused the request (conflict, missing
//!   target, permission, or any other backend error);
//! - transport: the request never got a verdict (network, pool, timeout).
//!
//! Only transport failures are worth repeating, and nothing in this crate
//! repeats them automatically.

use object_storage::StorageError;
use thiserror::Error;

use super::auth::AuthError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Rejected,
    Transport,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::Validation(_) => ErrorClass::Validation,
            AppError::Transport(_) => ErrorClass::Transport,
            AppError::Conflict(_)
            | AppError::Auth(_)
            | AppError::NotFound(_)
            | AppError::Backend(_) => ErrorClass::Rejected,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transport
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    /// Stable machine-readable code for API error extensions.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Auth(AuthError::AuthenticationRequired | AuthError::InvalidToken) => {
                "UNAUTHENTICATED"
            }
            AppError::Auth(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Backend(_) => "BACKEND",
            AppError::Transport(_) => "TRANSPORT",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &e {
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation => AppError::Conflict(
                    db.constraint()
                        .map(|c| format!("{} already taken", c))
                        .unwrap_or_else(|| db.message().to_string()),
                ),
                _ => AppError::Backend(db.message().to_string()),
            },
            sqlx::Error::RowNotFound => AppError::NotFound("row".to_string()),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => AppError::Transport(e.to_string()),
            _ => AppError::Backend(e.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InvalidPath(path) => {
                AppError::Validation(format!("invalid object path: {}", path))
            }
            ref err if err.is_transient() => AppError::Transport(err.to_string()),
            ref err if err.is_conflict() => AppError::Conflict(err.to_string()),
            err => AppError::Backend(err.to_string()),
        }
    }
}
