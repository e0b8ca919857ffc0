//! Helpers for driving the router in tests.

use axum::{
    body::Body,
    extract::FromRef,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, Response,
    },
};
use tower::ServiceExt;

use crate::{app::build_app, auth::session::SessionKeys, state::AppState};

pub async fn send(state: &AppState, req: Request<Body>) -> Response<Body> {
    build_app(state.clone())
        .oneshot(req)
        .await
        .expect("router is infallible")
}

pub async fn get(state: &AppState, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::get(uri);
    if let Some(cookie) = cookie {
        req = req.header(COOKIE, cookie);
    }
    send(state, req.body(Body::empty()).unwrap()).await
}

pub async fn post_form(state: &AppState, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        req = req.header(COOKIE, cookie);
    }
    send(state, req.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn body_string(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// `Cookie` header value for a logged-in `user_id`.
pub fn cookie_for(state: &AppState, user_id: i64) -> String {
    let keys = SessionKeys::from_ref(state);
    format!("session={}", keys.sign(user_id).expect("sign session"))
}

/// Session token from a response's `Set-Cookie`, if one was issued.
pub fn session_cookie_from(res: &Response<Body>) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix("session="))
        .filter_map(|v| v.split(';').next())
        .find(|token| !token.is_empty())
        .map(str::to_string)
}
