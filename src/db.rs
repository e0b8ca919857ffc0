use thiserror::Error;

/// Failures surfaced by the repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Maps `RowNotFound` from a fetch-by-id to a typed `NotFound`.
pub(crate) fn not_found_as(entity: &'static str, id: i64) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| match e {
        sqlx::Error::RowNotFound => StoreError::NotFound { entity, id },
        other => StoreError::Database(other),
    }
}
