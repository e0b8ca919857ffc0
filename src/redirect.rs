use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

pub const POSTS: &str = "/posts";

/// 302 Found to `location`.
pub fn found(location: &str) -> Response {
    match HeaderValue::try_from(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        // A location that isn't a valid header value can only come from a
        // hostile `next` parameter; send it to the listing instead.
        Err(_) => (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static(POSTS))]).into_response(),
    }
}

pub fn to_posts() -> Response {
    found(POSTS)
}

pub fn to_user(user_id: i64) -> Response {
    found(&format!("/user/{user_id}"))
}

pub fn to_login(next: &str) -> Response {
    found(&login_url(Some(next)))
}

pub fn login_url(next: Option<&str>) -> String {
    match next.filter(|n| !n.is_empty()) {
        Some(next) => format!("/login?next={}", encode_component(next)),
        None => "/login".to_string(),
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
