use std::str::FromStr;

use anyhow::Context;

/// Which recipes `GET /recipes` returns to a signed-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipeVisibility {
    /// Only the caller's own recipes.
    #[default]
    Own,
    /// Every recipe in the system.
    All,
}

impl FromStr for RecipeVisibility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "own" => Ok(Self::Own),
            "all" => Ok(Self::All),
            other => anyhow::bail!("unknown recipe visibility {other:?}, expected \"own\" or \"all\""),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Signing secret for the session cookie; at least 64 bytes.
    pub secret: String,
    pub cookie_name: String,
    /// Lifetime of a session; signed into the cookie and enforced on every request.
    pub ttl_hours: u32,
    pub secure: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub session: SessionConfig,
    pub recipe_visibility: RecipeVisibility,
}

pub const DEFAULT_COOKIE_NAME: &str = "recipebox_session";
pub const MIN_SECRET_LEN: usize = 64;
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 24 * 7;
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 365;

/// Parses `SESSION_TTL_HOURS`; unset means the default, anything outside
/// `1..=MAX_SESSION_TTL_HOURS` is an error.
pub fn parse_ttl_hours(raw: Option<&str>) -> anyhow::Result<u32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_SESSION_TTL_HOURS);
    };
    let hours: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("SESSION_TTL_HOURS must be a whole number, got {raw:?}"))?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        anyhow::bail!("SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}");
    }
    Ok(hours)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret = std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes");
        }

        let session = SessionConfig {
            secret,
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_COOKIE_NAME.into()),
            ttl_hours: parse_ttl_hours(std::env::var("SESSION_TTL_HOURS").ok().as_deref())?,
            secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        let recipe_visibility = match std::env::var("RECIPES_VISIBILITY") {
            Ok(v) => v.parse()?,
            Err(_) => RecipeVisibility::default(),
        };

        Ok(Self {
            database_url,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            session,
            recipe_visibility,
        })
    }
}
