//! Account password storage: argon2id in PHC string form.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("could not hash password: {0}")]
    Hash(String),
    #[error("stored password hash is unreadable: {0}")]
    MalformedHash(String),
}

pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// A mismatch is `Ok(false)`. Errors mean the stored hash itself is bad.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        warn!(error = %e, "account has an unparseable password hash");
        PasswordError::MalformedHash(e.to_string())
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_is_phc_and_salted() {
        let a = hash_password("password").unwrap();
        let b = hash_password("password").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(verify_password("password", &a).unwrap());
        assert!(verify_password("password", &b).unwrap());
    }

    #[test]
    fn wrong_password_is_a_mismatch_not_an_error() {
        let hash = hash_password("matrix").unwrap();
        assert!(!verify_password("Matrix", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn bcrypt_style_hashes_are_rejected() {
        let legacy = "$2a$10$92IXUNpkjO0rOQ5byMi.Ye4oKoEa3Ro9llC/.og/at2.uheWG/igi";
        let err = verify_password("password", legacy).unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }
}
