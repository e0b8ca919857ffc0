use std::{str::FromStr, sync::Arc};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("parse DATABASE_URL {}", config.database_url))?
            .create_if_missing(true)
            .foreign_keys(true);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("connect to database")?;

        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }

    /// In-memory database with the schema applied. A single long-lived
    /// connection keeps the memory database alive for the whole test.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        use crate::{auth::password::PasswordScheme, config::SessionConfig};

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("memory url parses")
            .foreign_keys(true);
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("in-memory pool");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            session: SessionConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                cookie_name: "session".into(),
                ttl_minutes: 5,
                secure_cookie: false,
            },
            password_scheme: PasswordScheme::Plaintext,
        });

        let state = Self::from_parts(db, config);
        state.migrate().await.expect("migrations apply");
        state
    }
}
