//! argon2id password hashing for stored user credentials.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use super::error::AccountError;

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `password` against a stored PHC string.
///
/// A mismatch is `Ok(false)`. A stored hash that does not parse is an error,
/// not a failed login.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let h1 = hash_password("password1").unwrap();
        let h2 = hash_password("password1").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn unparseable_stored_hash_is_a_hashing_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AccountError::Hashing(_))
        ));
    }
}
