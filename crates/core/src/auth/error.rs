//! Account error types.

use tally_shared::AppError;
use tally_shared::types::UserId;
use thiserror::Error;

/// Errors raised by account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The verified identity lacks a subject or email.
    #[error("identity is missing {0}")]
    IncompleteIdentity(&'static str),

    /// Another user already holds this email.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// User record not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Persistence failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::IncompleteIdentity(_) => Self::Validation(err.to_string()),
            AuthError::EmailTaken(_) => Self::Conflict(err.to_string()),
            AuthError::UserNotFound(_) => Self::NotFound(err.to_string()),
            AuthError::Storage(msg) => Self::Database(msg),
        }
    }
}
