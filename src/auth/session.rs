use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::{SessionConfig, MAX_SESSION_TTL_HOURS},
    error::AppError,
    state::AppState,
};

/// The signed-in user's id, taken from the signed session cookie.
///
/// Rejects with 401 when the cookie is missing, tampered with or expired.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.key.clone());
        current_user_id(&jar, &state.config.session)
            .map(SessionUser)
            .ok_or_else(AppError::unauthorized)
    }
}

/// The signed cookie value: `<user id>.<expiry as unix seconds>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionToken {
    user_id: Uuid,
    expires_at: i64,
}

impl SessionToken {
    fn encode(&self) -> String {
        format!("{}.{}", self.user_id, self.expires_at)
    }

    fn decode(value: &str) -> Option<Self> {
        let (id, expires) = value.split_once('.')?;
        Some(Self {
            user_id: Uuid::parse_str(id).ok()?,
            expires_at: expires.parse().ok()?,
        })
    }
}

/// User id stored in `jar`, if its signature checks out and it has not expired.
pub fn current_user_id(jar: &SignedCookieJar, cfg: &SessionConfig) -> Option<Uuid> {
    user_id_at(jar, cfg, OffsetDateTime::now_utc())
}

fn user_id_at(jar: &SignedCookieJar, cfg: &SessionConfig, now: OffsetDateTime) -> Option<Uuid> {
    let cookie = jar.get(&cfg.cookie_name)?;
    let token = SessionToken::decode(cookie.value())?;
    if now.unix_timestamp() >= token.expires_at {
        debug!(user_id = %token.user_id, "session expired");
        return None;
    }
    Some(token.user_id)
}

pub fn start(jar: SignedCookieJar, cfg: &SessionConfig, user_id: Uuid) -> SignedCookieJar {
    start_at(jar, cfg, user_id, OffsetDateTime::now_utc())
}

fn start_at(
    jar: SignedCookieJar,
    cfg: &SessionConfig,
    user_id: Uuid,
    now: OffsetDateTime,
) -> SignedCookieJar {
    let ttl = Duration::hours(i64::from(cfg.ttl_hours.min(MAX_SESSION_TTL_HOURS)));
    let token = SessionToken {
        user_id,
        expires_at: (now + ttl).unix_timestamp(),
    };
    let mut cookie = Cookie::new(cfg.cookie_name.clone(), token.encode());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(cfg.secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(ttl);
    debug!(%user_id, expires_at = token.expires_at, "session started");
    jar.add(cookie)
}

pub fn end(jar: SignedCookieJar, cfg: &SessionConfig) -> SignedCookieJar {
    let mut removal = Cookie::new(cfg.cookie_name.clone(), "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(Duration::seconds(0));
    jar.remove(removal)
}
