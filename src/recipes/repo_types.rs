use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ValidationError;

pub const TITLE_MAX_LEN: usize = 100;
pub const INSTRUCTIONS_MIN_LEN: usize = 50;
pub const INSTRUCTIONS_MAX_LEN: usize = 2000;

/// Recipe record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Recipe joined with the columns of its owner that may be shown to clients.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeWithOwner {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
    pub created_at: OffsetDateTime,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl From<RecipeWithOwner> for Recipe {
    fn from(r: RecipeWithOwner) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            instructions: r.instructions,
            minutes_to_complete: r.minutes_to_complete,
            created_at: r.created_at,
        }
    }
}

/// A validated recipe ready to be inserted for `user_id`.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub user_id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
}

impl NewRecipe {
    pub fn new(
        user_id: Uuid,
        title: &str,
        instructions: &str,
        minutes_to_complete: i32,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError("Title is required".into()));
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(ValidationError(format!(
                "Title must be at most {TITLE_MAX_LEN} characters"
            )));
        }

        let len = instructions.chars().count();
        if len < INSTRUCTIONS_MIN_LEN {
            return Err(ValidationError(format!(
                "Instructions must be at least {INSTRUCTIONS_MIN_LEN} characters"
            )));
        }
        if len > INSTRUCTIONS_MAX_LEN {
            return Err(ValidationError(format!(
                "Instructions must be at most {INSTRUCTIONS_MAX_LEN} characters"
            )));
        }

        if minutes_to_complete < 0 {
            return Err(ValidationError(
                "minutes_to_complete must not be negative".into(),
            ));
        }

        Ok(Self {
            user_id,
            title: title.to_string(),
            instructions: instructions.to_string(),
            minutes_to_complete,
        })
    }
}
