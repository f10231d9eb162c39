use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::password::hash_password;
use crate::error::ValidationError;

pub const USERNAME_MAX_LEN: usize = 50;
pub const IMAGE_URL_MAX_LEN: usize = 255;
pub const BIO_MAX_LEN: usize = 500;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string, never exposed in JSON
    pub image_url: Option<String>,
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated user that has not been stored yet.
///
/// The only way to get a `password_hash` in here is through [`NewUser::new`],
/// which hashes the password and refuses an empty one.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl NewUser {
    pub fn new(
        username: &str,
        password: &str,
        image_url: Option<String>,
        bio: Option<String>,
    ) -> Result<Self, anyhow::Error> {
        let username = validate_username(username)?;
        let image_url = optional_field(image_url, "image_url", IMAGE_URL_MAX_LEN)?;
        let bio = optional_field(bio, "bio", BIO_MAX_LEN)?;
        let password_hash = hash_password(password)?;
        Ok(Self {
            username,
            password_hash,
            image_url,
            bio,
        })
    }
}

pub fn validate_username(username: &str) -> Result<String, ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError("Username is required".into()));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(ValidationError(format!(
            "Username must be at most {USERNAME_MAX_LEN} characters"
        )));
    }
    Ok(username.to_string())
}

// Blank optional fields are stored as NULL.
fn optional_field(
    value: Option<String>,
    name: &str,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Ok(None),
        Some(v) if v.chars().count() > max_len => Err(ValidationError(format!(
            "{name} must be at most {max_len} characters"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[test]
    fn new_user_hashes_password() {
        let user = NewUser::new("chef", "s3cret", None, None).expect("valid user");
        assert_eq!(user.username, "chef");
        assert_ne!(user.password_hash, "s3cret");
        assert!(verify_password("s3cret", &user.password_hash).unwrap());
    }

    #[test]
    fn new_user_rejects_empty_password() {
        let err = NewUser::new("chef", "", None, None).unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().expect("validation error");
        assert_eq!(validation.0, "Password is required");
    }

    #[test]
    fn new_user_rejects_blank_username() {
        let err = NewUser::new("   ", "pw", None, None).unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[test]
    fn username_length_is_capped() {
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LEN)).is_ok());
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let user = NewUser::new("chef", "pw", Some("".into()), Some("  ".into())).unwrap();
        assert!(user.image_url.is_none());
        assert!(user.bio.is_none());
    }

    #[test]
    fn long_bio_is_rejected() {
        let err = NewUser::new("chef", "pw", None, Some("b".repeat(BIO_MAX_LEN + 1))).unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[test]
    fn serialized_user_has_no_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "chef".into(),
            password_hash: "$argon2id$secret".into(),
            image_url: None,
            bio: Some("likes soup".into()),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
    }
}
