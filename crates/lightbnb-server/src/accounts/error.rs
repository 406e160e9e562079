//! Errors for account operations.

use crate::storage::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    EmailTaken,

    /// Unknown email and wrong password both map here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Hashing failed, or a stored hash could not be parsed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<argon2::password_hash::Error> for AccountError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self::Hashing(e.to_string())
    }
}
