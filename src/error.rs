use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{db::StoreError, redirect, views};

/// Request-level failures. Each variant maps to exactly one kind of response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    /// Anonymous request on a guarded route; `next` is the path to return to.
    #[error("login required")]
    Unauthorized { next: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => AppError::NotFound,
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(views::error_page(StatusCode::NOT_FOUND)),
            )
                .into_response(),
            AppError::Forbidden => {
                warn!("ownership check failed");
                (
                    StatusCode::FORBIDDEN,
                    Html(views::error_page(StatusCode::FORBIDDEN)),
                )
                    .into_response()
            }
            AppError::Unauthorized { next } => redirect::to_login(&next),
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(StatusCode::INTERNAL_SERVER_ERROR)),
                )
                    .into_response()
            }
        }
    }
}
