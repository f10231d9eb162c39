use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateRecipeRequest, RecipeResponse},
    repo_types::NewRecipe,
};
use crate::{
    auth::{dto::PublicUser, repo_types::User, session::SessionUser},
    config::RecipeVisibility,
    error::AppError,
    extract::JsonOrForm,
    state::AppState,
    storage::StoreError,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

async fn session_owner(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    state.store.find_user_by_id(user_id).await?.ok_or_else(|| {
        warn!(%user_id, "session refers to a missing user");
        AppError::Unauthorized("User not found".into())
    })
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    session_owner(&state, user_id).await?;

    let owner = match state.config.recipe_visibility {
        RecipeVisibility::Own => Some(user_id),
        RecipeVisibility::All => None,
    };
    let rows = state.store.list_recipes(owner).await?;
    Ok(Json(rows.into_iter().map(RecipeResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    payload: Result<JsonOrForm<CreateRecipeRequest>, AppError>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    // A vanished session user is a 401 whatever the body looks like.
    let owner = session_owner(&state, user_id).await?;

    let JsonOrForm(payload, kind) = payload?;
    let (Some(title), Some(instructions)) = (&payload.title, &payload.instructions) else {
        return Err(AppError::Validation("Invalid recipe data".into()));
    };
    let minutes = payload.minutes(kind)?;
    let new_recipe = NewRecipe::new(user_id, title, instructions, minutes)?;

    let recipe = match state.store.create_recipe(new_recipe).await {
        Ok(r) => r,
        Err(StoreError::NotFound(_)) => {
            return Err(AppError::Unauthorized("User not found".into()));
        }
        Err(e) => {
            error!(error = %e, %user_id, "create recipe failed");
            return Err(AppError::Internal(e.into()));
        }
    };

    info!(recipe_id = %recipe.id, %user_id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(RecipeResponse::new(recipe, PublicUser::from(&owner))),
    ))
}
