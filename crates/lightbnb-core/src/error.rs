//! Error types for `LightBnB` core library.

use thiserror::Error;

/// Result type alias using `LightBnB` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `LightBnB` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
