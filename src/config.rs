use std::fmt;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const ENV_BACKEND_URL: &str = "ADMIN_BACKEND_URL";
pub const ENV_FRONTEND_URL: &str = "ADMIN_FRONTEND_URL";
pub const ENV_AUTH_SECRET: &str = "ADMIN_AUTH_SECRET";
pub const ENV_SESSION_MAX_AGE: &str = "ADMIN_SESSION_MAX_AGE_SECS";

/// Prefix every administrative endpoint lives under.
pub const ADMIN_PREFIX: &str = "/api/admin";
pub const UPLOAD_IMAGE_PATH: &str = "/api/upload/image";

/// Process-wide settings consumed by the access layer. Loaded once at startup and
/// passed by value into the signer, fetcher and list views.
#[derive(Clone)]
pub struct AdminConfig {
    pub backend_origin: String,
    pub frontend_origin: String,
    auth_secret: String,
    pub session_max_age: Duration,
    pub users_debounce: Duration,
    pub blogs_debounce: Duration,
}

impl AdminConfig {
    pub fn new<S: Into<String>>(backend_origin: S, frontend_origin: S, auth_secret: S) -> Self {
        Self {
            backend_origin: trim_origin(backend_origin.into()),
            frontend_origin: trim_origin(frontend_origin.into()),
            auth_secret: auth_secret.into(),
            session_max_age: Duration::from_secs(30 * 24 * 60 * 60),
            users_debounce: Duration::from_millis(500),
            blogs_debounce: Duration::from_millis(300),
        }
    }

    pub fn from_env() -> AppResult<Self> {
        let backend = required(ENV_BACKEND_URL)?;
        let frontend = required(ENV_FRONTEND_URL)?;
        let secret = required(ENV_AUTH_SECRET)?;
        let mut cfg = Self::new(backend, frontend, secret);
        if let Ok(raw) = std::env::var(ENV_SESSION_MAX_AGE) {
            cfg.session_max_age = parse_max_age(&raw)?;
        }
        Ok(cfg)
    }

    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    pub fn auth_secret(&self) -> &str { &self.auth_secret }

    /// `{backend}/api/admin{path}`
    pub fn admin_url(&self, path: &str) -> String {
        format!("{}{}{}", self.backend_origin, ADMIN_PREFIX, path)
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.backend_origin, UPLOAD_IMAGE_PATH)
    }

    /// Public profile page on the user-facing site.
    pub fn profile_url(&self, user_id: &str) -> String {
        format!("{}/profile/{}", self.frontend_origin, user_id)
    }

    pub fn blog_url(&self, slug: &str) -> String {
        format!("{}/blogs/blog/{}", self.frontend_origin, slug)
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("backend_origin", &self.backend_origin)
            .field("frontend_origin", &self.frontend_origin)
            .field("auth_secret", &"<redacted>")
            .field("session_max_age", &self.session_max_age)
            .finish()
    }
}

fn required(name: &str) -> AppResult<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Config(format!("{} is not set", name))),
    }
}

/// Seconds as a session lifetime. Must fit a signed epoch offset.
fn parse_max_age(raw: &str) -> AppResult<Duration> {
    let invalid = || AppError::Config(format!("{} must be a number of seconds up to {}, got '{}'", ENV_SESSION_MAX_AGE, i64::MAX, raw));
    let secs: u64 = raw.trim().parse().map_err(|_| invalid())?;
    i64::try_from(secs).map_err(|_| invalid())?;
    Ok(Duration::from_secs(secs))
}

fn trim_origin(s: String) -> String {
    s.trim().trim_end_matches('/').to_string()
}
