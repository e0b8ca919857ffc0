use axum::{
    extract::{FromRef, Query, State},
    http::{header::SET_COOKIE, HeaderValue},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{LoginForm, NextQuery, RegisterForm},
    extractors::CurrentUser,
    services::{authenticate, check_availability, register},
    session::SessionKeys,
};
use crate::{error::AppError, redirect, state::AppState, validation::FormErrors, views};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register_submit))
        .route("/login", get(login_form).post(login_submit))
        .route("/logout", get(logout))
}

#[instrument(skip_all)]
pub async fn register_form(CurrentUser(current): CurrentUser) -> Html<String> {
    Html(views::register_page(
        current.as_ref(),
        &RegisterForm::default(),
        &FormErrors::new(),
    ))
}

#[instrument(skip_all, fields(username = %form.username))]
pub async fn register_submit(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let availability = check_availability(&state.db, &form).await?;
    let new_user = match form.validate(availability) {
        Ok(u) => u,
        Err(errors) => {
            warn!("registration rejected");
            return Ok(Html(views::register_page(current.as_ref(), &form, &errors)).into_response());
        }
    };

    let user = register(&state.db, state.config.password_scheme, &new_user).await?;
    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(redirect::to_posts())
}

#[instrument(skip_all)]
pub async fn login_form(
    CurrentUser(current): CurrentUser,
    Query(query): Query<NextQuery>,
) -> Response {
    if current.is_some() {
        return redirect::to_posts();
    }
    Html(views::login_page(&LoginForm::default(), &FormErrors::new(), query.target())).into_response()
}

#[instrument(skip_all, fields(username = %form.username))]
pub async fn login_submit(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(redirect::to_posts());
    }

    let rerender = |errors: &FormErrors| {
        Html(views::login_page(&form, errors, query.target())).into_response()
    };

    let credentials = match form.validate() {
        Ok(c) => c,
        Err(errors) => return Ok(rerender(&errors)),
    };

    let Some(user) = authenticate(&state.db, state.config.password_scheme, &credentials).await? else {
        return Ok(rerender(&FormErrors::new()));
    };

    let keys = SessionKeys::from_ref(&state);
    let cookie = HeaderValue::try_from(keys.login_cookie(user.id)?)
        .map_err(|e| AppError::Internal(e.into()))?;

    info!(user_id = user.id, "user logged in");
    let mut res = match query.target() {
        Some(next) => redirect::found(next),
        None => redirect::to_posts(),
    };
    res.headers_mut().append(SET_COOKIE, cookie);
    Ok(res)
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let mut res = redirect::to_posts();
    if let Ok(cookie) = HeaderValue::try_from(keys.logout_cookie()) {
        res.headers_mut().append(SET_COOKIE, cookie);
    }
    res
}
