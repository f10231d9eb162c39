use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::config::{AppConfig, RecipeVisibility, SessionConfig, DEFAULT_COOKIE_NAME};
use crate::db::{self, PgStore};
use crate::storage::{MemoryStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl AppState {
    /// Reads the environment, connects to Postgres and applies migrations.
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let pool = db::connect(&config).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
        let store = Arc::new(PgStore::new(pool)) as Arc<dyn Store>;
        Self::from_parts(store, config)
    }

    pub fn from_parts(store: Arc<dyn Store>, config: AppConfig) -> anyhow::Result<Self> {
        let key = Key::try_from(config.session.secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid session secret: {e:?}"))?;
        Ok(Self {
            store,
            config: Arc::new(config),
            key,
        })
    }

    /// State over a fresh [`MemoryStore`], for tests and local experiments.
    pub fn in_memory(recipe_visibility: RecipeVisibility) -> (Self, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::new());
        let config = AppConfig {
            database_url: "memory://".into(),
            db_max_connections: 1,
            session: SessionConfig {
                secret: "recipebox-test-secret-".repeat(4),
                cookie_name: DEFAULT_COOKIE_NAME.into(),
                ttl_hours: 1,
                secure: false,
            },
            recipe_visibility,
        };
        let key = Key::from(config.session.secret.as_bytes());
        let state = Self {
            store: memory.clone() as Arc<dyn Store>,
            config: Arc::new(config),
            key,
        };
        (state, memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let (state, _) = AppState::in_memory(RecipeVisibility::Own);
        let mut config = (*state.config).clone();
        config.session.secret = "too-short".into();
        assert!(AppState::from_parts(state.store.clone(), config).is_err());
    }

    #[test]
    fn in_memory_state_uses_requested_visibility() {
        let (state, _) = AppState::in_memory(RecipeVisibility::All);
        assert_eq!(state.config.recipe_visibility, RecipeVisibility::All);
    }
}
