use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{
    repo_types::User,
    session::{SessionKeys, SessionState},
};
use crate::{error::AppError, state::AppState};

/// The user behind the request's session, re-read from the store on every
/// request. `None` when anonymous.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let user_id = match keys.resolve(&parts.headers) {
            SessionState::Anonymous => return Ok(CurrentUser(None)),
            SessionState::Authenticated(id) => id,
        };

        match User::get(&state.db, user_id).await {
            Ok(user) => Ok(CurrentUser(Some(user))),
            Err(e) if e.is_not_found() => {
                warn!(user_id, "session names a user that no longer exists");
                Ok(CurrentUser(None))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Guard for routes that need a logged-in user. Anonymous requests are sent
/// to the login page with the original path as `next`.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        user.map(AuthUser).ok_or_else(|| {
            let next = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string());
            AppError::Unauthorized { next }
        })
    }
}
