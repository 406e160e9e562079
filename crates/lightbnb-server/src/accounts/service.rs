//! Signup and login against the user repository.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::error::AccountError;
use super::password;
use crate::storage::{DatabaseError, LightbnbDatabase, NewUser, User};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Register a new user with a freshly hashed password.
#[instrument(skip(db, request), fields(email = %request.email))]
pub async fn signup(db: &LightbnbDatabase, request: SignupRequest) -> Result<User, AccountError> {
    let name = request.name.trim();
    let email = request.email.trim();

    if name.is_empty() {
        return Err(AccountError::Validation("Name is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AccountError::Validation(
            "A valid email is required".to_string(),
        ));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AccountError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if db.get_user_with_email(email).await?.is_some() {
        return Err(AccountError::EmailTaken);
    }

    let password_hash = password::hash_password(&request.password)?;

    let user = db
        .create_user(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent signup for the same email.
            DatabaseError::ConstraintViolation(_) => AccountError::EmailTaken,
            other => AccountError::Database(other),
        })?;

    info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Resolve an email/password pair to its user.
#[instrument(skip(db, password))]
pub async fn login(
    db: &LightbnbDatabase,
    email: &str,
    password: &str,
) -> Result<User, AccountError> {
    let Some(user) = db.get_user_with_email(email.trim()).await? else {
        warn!("Login for unknown email");
        return Err(AccountError::InvalidCredentials);
    };

    if !password::verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "Failed login attempt");
        return Err(AccountError::InvalidCredentials);
    }

    info!(user_id = user.id, "User logged in");
    Ok(user)
}

/// Look up the user a session points at.
pub async fn current_user(
    db: &LightbnbDatabase,
    user_id: i64,
) -> Result<Option<User>, AccountError> {
    Ok(db.get_user_with_id(user_id).await?)
}
