use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, SignupRequest, UserWithRecipes},
        password::verify_password,
        repo_types::NewUser,
        session::{self, SessionUser},
    },
    error::AppError,
    extract::JsonOrForm,
    recipes::repo_types::Recipe,
    state::AppState,
    storage::StoreError,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", delete(logout))
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/check_session", get(check_session))
}

const MISSING_FIELDS: &str = "Missing required fields";

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    JsonOrForm(payload, _): JsonOrForm<SignupRequest>,
) -> Result<(StatusCode, SignedCookieJar, Json<UserWithRecipes>), AppError> {
    let (Some(username), Some(password)) = (required(payload.username), required(payload.password))
    else {
        warn!("signup missing username or password");
        return Err(AppError::Validation(MISSING_FIELDS.into()));
    };

    let new_user = NewUser::new(&username, &password, payload.image_url, payload.bio)?;

    let user = match state.store.create_user(new_user).await {
        Ok(u) => u,
        Err(StoreError::Conflict(msg)) => {
            warn!(%username, "username already taken");
            return Err(AppError::Conflict(msg));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(AppError::Internal(e.into()));
        }
    };

    let jar = session::start(jar, &state.config.session, user.id);
    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserWithRecipes {
            user: PublicUser::from(&user),
            recipes: Vec::new(),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    JsonOrForm(payload, _): JsonOrForm<LoginRequest>,
) -> Result<(SignedCookieJar, Json<UserWithRecipes>), AppError> {
    let (Some(username), Some(password)) = (required(payload.username), required(payload.password))
    else {
        return Err(AppError::Validation(MISSING_FIELDS.into()));
    };
    let username = username.trim();

    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let user = match state.store.find_user_by_username(username).await? {
        Some(u) => u,
        None => {
            warn!(%username, "login unknown username");
            return Err(invalid());
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let recipes = state
        .store
        .list_recipes(Some(user.id))
        .await?
        .into_iter()
        .map(Recipe::from)
        .collect();

    let jar = session::start(jar, &state.config.session, user.id);
    info!(user_id = %user.id, "user logged in");
    Ok((
        jar,
        Json(UserWithRecipes {
            user: PublicUser::from(&user),
            recipes,
        }),
    ))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    jar: SignedCookieJar,
) -> (StatusCode, SignedCookieJar) {
    info!(%user_id, "user logged out");
    (StatusCode::NO_CONTENT, session::end(jar, &state.config.session))
}

#[instrument(skip(state, jar))]
pub async fn check_session(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    jar: SignedCookieJar,
) -> Result<Json<PublicUser>, (SignedCookieJar, AppError)> {
    match state.store.find_user_by_id(user_id).await {
        Ok(Some(user)) => Ok(Json(PublicUser::from(&user))),
        Ok(None) => {
            warn!(%user_id, "session refers to a missing user");
            Err((
                session::end(jar, &state.config.session),
                AppError::Unauthorized("User not found".into()),
            ))
        }
        Err(e) => Err((jar, AppError::from(e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_values() {
        assert_eq!(required(None), None);
        assert_eq!(required(Some("   ".into())), None);
        assert_eq!(required(Some("chef".into())), Some("chef".to_string()));
    }
}
