use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::ValidationError;

/// Hashes a user's password into an argon2 PHC string.
///
/// An empty password is a [`ValidationError`], so no account can be created
/// without one.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    if plain.is_empty() {
        return Err(ValidationError("Password is required".into()).into());
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// Checks a login attempt against a stored hash.
///
/// `Ok(false)` for a wrong or empty password; `Err` only when the stored hash is
/// unreadable.
pub fn verify_password(plain: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is unreadable");
        anyhow::anyhow!("parse stored password hash: {e}")
    })?;
    if plain.is_empty() {
        return Ok(false);
    }
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("pan-fried-gnocchi").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pan-fried-gnocchi", &hash).expect("verify should succeed"));
    }

    #[test]
    fn empty_password_is_a_validation_error() {
        let err = hash_password("").unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().expect("validation error");
        assert_eq!(validation.0, "Password is required");
    }

    #[test]
    fn verify_rejects_wrong_or_empty_password() {
        let hash = hash_password("pan-fried-gnocchi").expect("hashing should succeed");
        assert!(!verify_password("boiled-gnocchi", &hash).expect("verify should not error"));
        assert!(!verify_password("", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_errors_on_corrupt_stored_hash() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }
}
