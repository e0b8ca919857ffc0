use sqlx::SqlitePool;

use crate::auth::repo_types::User;
use crate::db::{not_found_as, StoreError};

impl User {
    /// Insert a user; `password` is stored as given.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "user" (username, email, password)
            VALUES (?, ?, ?)
            RETURNING id, username, email, password
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Load a user by id, `NotFound` if there is none.
    pub async fn get(db: &SqlitePool, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password FROM "user" WHERE id = ?"#,
        )
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(not_found_as("user", id))
    }

    /// Exact, case-sensitive username match.
    pub async fn find_by_username(
        db: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password
            FROM "user"
            WHERE username = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password
            FROM "user"
            WHERE email = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
