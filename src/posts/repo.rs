use sqlx::SqlitePool;
use time::PrimitiveDateTime;

use super::repo_types::{BlogPost, PostSummary};
use crate::db::{not_found_as, StoreError};

impl BlogPost {
    pub async fn create(
        db: &SqlitePool,
        title: &str,
        content: &str,
        author_id: i64,
        date_posted: PrimitiveDateTime,
    ) -> Result<BlogPost, StoreError> {
        let post = sqlx::query_as::<_, BlogPost>(
            r#"
            INSERT INTO blog_post (title, content, date_posted, author_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, content, date_posted, author_id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(date_posted)
        .bind(author_id)
        .fetch_one(db)
        .await?;
        Ok(post)
    }

    pub async fn get(db: &SqlitePool, id: i64) -> Result<BlogPost, StoreError> {
        sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT id, title, content, date_posted, author_id
            FROM blog_post
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(not_found_as("blog post", id))
    }

    /// First post with exactly this title, across all authors.
    pub async fn find_by_title(db: &SqlitePool, title: &str) -> Result<Option<BlogPost>, StoreError> {
        let post = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT id, title, content, date_posted, author_id
            FROM blog_post
            WHERE title = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(title)
        .fetch_optional(db)
        .await?;
        Ok(post)
    }

    /// Every post, oldest first, with the author's username.
    pub async fn list_all(db: &SqlitePool) -> Result<Vec<PostSummary>, StoreError> {
        let rows = sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT p.id, p.title, p.content, p.date_posted, p.author_id,
                   u.username AS author_username
            FROM blog_post p
            JOIN "user" u ON u.id = p.author_id
            ORDER BY p.date_posted ASC, p.id ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_author(db: &SqlitePool, author_id: i64) -> Result<Vec<BlogPost>, StoreError> {
        let rows = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT id, title, content, date_posted, author_id
            FROM blog_post
            WHERE author_id = ?
            ORDER BY date_posted ASC, id ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Writes title and content back; `date_posted` is left alone.
    pub async fn update(&self, db: &SqlitePool) -> Result<(), StoreError> {
        let result = sqlx::query(r#"UPDATE blog_post SET title = ?, content = ? WHERE id = ?"#)
            .bind(&self.title)
            .bind(&self.content)
            .bind(self.id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "blog post", id: self.id });
        }
        Ok(())
    }

    pub async fn delete(&self, db: &SqlitePool) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM blog_post WHERE id = ?"#)
            .bind(self.id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "blog post", id: self.id });
        }
        Ok(())
    }
}
