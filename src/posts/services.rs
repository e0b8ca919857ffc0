use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{
    dto::PostInput,
    repo_types::{utc_now, BlogPost},
};
use crate::{auth::repo_types::User, db::StoreError, error::AppError};

#[derive(Debug)]
pub enum CreateOutcome {
    Created(BlogPost),
    /// Some post, by anyone, already has this title; nothing was written.
    DuplicateTitle,
}

#[derive(Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    Unchanged,
}

/// Only the author may touch a post.
pub fn ensure_owner(post: &BlogPost, user: &User) -> Result<(), AppError> {
    if post.is_owned_by(user.id) {
        Ok(())
    } else {
        warn!(post_id = post.id, author_id = post.author_id, user_id = user.id, "not the author");
        Err(AppError::Forbidden)
    }
}

pub async fn create_post(
    db: &SqlitePool,
    author: &User,
    input: PostInput,
) -> Result<CreateOutcome, StoreError> {
    if let Some(existing) = BlogPost::find_by_title(db, &input.title).await? {
        info!(existing_id = existing.id, "post title already used; skipping create");
        return Ok(CreateOutcome::DuplicateTitle);
    }
    let post = BlogPost::create(db, &input.title, &input.content, author.id, utc_now()).await?;
    info!(post_id = post.id, author_id = author.id, "post created");
    Ok(CreateOutcome::Created(post))
}

pub async fn edit_post(
    db: &SqlitePool,
    mut post: BlogPost,
    input: PostInput,
) -> Result<EditOutcome, StoreError> {
    if post.title == input.title && post.content == input.content {
        return Ok(EditOutcome::Unchanged);
    }
    post.title = input.title;
    post.content = input.content;
    post.update(db).await?;
    info!(post_id = post.id, "post updated");
    Ok(EditOutcome::Updated)
}

pub async fn delete_post(db: &SqlitePool, post: &BlogPost) -> Result<(), StoreError> {
    post.delete(db).await?;
    info!(post_id = post.id, "post deleted");
    Ok(())
}
