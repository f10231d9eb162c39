use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;
use crate::recipes::repo_types::Recipe;

/// Request body for signup. Fields are optional so that a missing one
/// is reported as a 422 by the handler instead of a decoding error.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            image_url: u.image_url.clone(),
            bio: u.bio.clone(),
        }
    }
}

/// User together with the recipes they own, returned by signup and login.
#[derive(Debug, Serialize)]
pub struct UserWithRecipes {
    #[serde(flatten)]
    pub user: PublicUser,
    pub recipes: Vec<Recipe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_with_recipes_is_flat() {
        let body = UserWithRecipes {
            user: PublicUser {
                id: Uuid::nil(),
                username: "chef".into(),
                image_url: None,
                bio: Some("bakes".into()),
            },
            recipes: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["username"], "chef");
        assert_eq!(json["bio"], "bakes");
        assert!(json["recipes"].as_array().unwrap().is_empty());
        assert!(json.get("user").is_none());
    }

    #[test]
    fn signup_request_tolerates_missing_fields() {
        let req: SignupRequest = serde_json::from_str(r#"{"username":"chef"}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some("chef"));
        assert!(req.password.is_none());
    }
}
