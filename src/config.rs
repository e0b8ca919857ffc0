use anyhow::Context;
use serde::Deserialize;

use crate::auth::password::PasswordScheme;

const DEFAULT_DATABASE_URL: &str = "sqlite://posts.db";
/// A century; expiry timestamps must stay inside `time`'s date range.
const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365 * 100;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub password_scheme: PasswordScheme,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let secret = lookup("SECRET_KEY").context("SECRET_KEY must be set")?;
        anyhow::ensure!(!secret.is_empty(), "SECRET_KEY must not be empty");

        let ttl_minutes = match lookup("SESSION_TTL_MINUTES") {
            Some(v) => v
                .parse::<i64>()
                .with_context(|| format!("invalid SESSION_TTL_MINUTES: {v}"))?,
            None => 60 * 24 * 14,
        };
        anyhow::ensure!(ttl_minutes > 0, "SESSION_TTL_MINUTES must be positive");
        anyhow::ensure!(
            ttl_minutes <= MAX_SESSION_TTL_MINUTES,
            "SESSION_TTL_MINUTES must be at most {MAX_SESSION_TTL_MINUTES}"
        );

        let secure_cookie = match lookup("SESSION_COOKIE_SECURE") {
            Some(v) => v
                .parse::<bool>()
                .with_context(|| format!("invalid SESSION_COOKIE_SECURE: {v}"))?,
            None => false,
        };

        let session = SessionConfig {
            secret,
            issuer: lookup("SESSION_ISSUER").unwrap_or_else(|| "blogpost".into()),
            cookie_name: lookup("SESSION_COOKIE_NAME").unwrap_or_else(|| "session".into()),
            ttl_minutes,
            secure_cookie,
        };

        let password_scheme = match lookup("PASSWORD_SCHEME") {
            Some(v) => v.parse::<PasswordScheme>()?,
            None => PasswordScheme::default(),
        };

        Ok(Self {
            database_url,
            session,
            password_scheme,
        })
    }
}
