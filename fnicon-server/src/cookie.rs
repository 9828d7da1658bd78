//! Session cookie formatting and parsing.

use axum::http::{HeaderMap, header};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionId";

/// `Set-Cookie` value carrying `token` for `timeout_minutes`.
pub fn session_cookie(token: &str, timeout_minutes: u32) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={}",
        u64::from(timeout_minutes) * 60
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; Max-Age=0")
}

/// Extracts the session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(name, value)| {
            let value = value.trim();
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}
