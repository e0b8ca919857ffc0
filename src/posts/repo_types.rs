use sqlx::FromRow;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Blog post record. `date_posted` is UTC without an offset, which is how
/// the table has always stored it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub date_posted: PrimitiveDateTime,
    pub author_id: i64,
}

/// Listing row: a post plus its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub date_posted: PrimitiveDateTime,
    pub author_id: i64,
    pub author_username: String,
}

impl BlogPost {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

pub fn utc_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}
