//! Account operations: signup, login, and current-user lookup.
//!
//! Session and cookie handling belong to the HTTP layer; these functions
//! only resolve a request to a stored [`User`](crate::storage::User).

mod error;
mod password;
mod service;

pub use error::AccountError;
pub use password::{hash_password, verify_password};
pub use service::{MIN_PASSWORD_LEN, SignupRequest, current_user, login, signup};
