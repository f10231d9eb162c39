use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Recipe, RecipeWithOwner};
use crate::auth::dto::PublicUser;
use crate::error::ValidationError;
use crate::extract::BodyKind;

/// Body of `POST /recipes`.
///
/// `minutes_to_complete` stays a raw value so that a JSON `"30"` or `30.5`
/// is reported as a field error rather than a decoding failure. Form bodies
/// only carry strings, so there it is parsed from text.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<serde_json::Value>,
}

impl CreateRecipeRequest {
    pub fn minutes(&self, kind: BodyKind) -> Result<i32, ValidationError> {
        let minutes = match (kind, self.minutes_to_complete.as_ref()) {
            (BodyKind::Json, Some(value)) => value.as_i64(),
            (BodyKind::Form, Some(serde_json::Value::String(text))) => text.trim().parse().ok(),
            _ => None,
        };
        minutes
            .and_then(|m| i32::try_from(m).ok())
            .ok_or_else(|| ValidationError("minutes_to_complete must be an integer".into()))
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: PublicUser,
}

impl RecipeResponse {
    pub fn new(recipe: Recipe, user: PublicUser) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            instructions: recipe.instructions,
            minutes_to_complete: recipe.minutes_to_complete,
            user_id: recipe.user_id,
            created_at: recipe.created_at,
            user,
        }
    }
}

impl From<RecipeWithOwner> for RecipeResponse {
    fn from(r: RecipeWithOwner) -> Self {
        let user = PublicUser {
            id: r.user_id,
            username: r.username.clone(),
            image_url: r.image_url.clone(),
            bio: r.bio.clone(),
        };
        Self::new(Recipe::from(r), user)
    }
}
