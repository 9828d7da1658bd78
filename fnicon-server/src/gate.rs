//! Session gate in front of every non-public route.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use fnicon_store::SessionStatus;
use tracing::{debug, warn};

use crate::cookie::{clear_session_cookie, session_cookie, session_token};
use crate::state::AppState;

/// Path prefixes reachable without a session.
pub const PUBLIC_PATHS: &[&str] = &[
    "/login.html",
    "/api/login",
    "/api/init-password",
    "/styles.css",
    "/favicon.ico",
];

/// Returns true if `path` bypasses the gate.
pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| path.starts_with(p))
}

/// Lets requests with a live session through and sends everything else
/// to the login page.
///
/// A passing request has its session extended and the cookie re-issued
/// unless the handler already set one.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = session_token(request.headers()) else {
        debug!(path = %request.uri().path(), "No session cookie");
        return login_redirect(&state, false).await;
    };

    match state.sessions.validate(&token).await {
        SessionStatus::Active {
            timeout_minutes, ..
        } => {
            let mut response = next.run(request).await;
            if !response.headers().contains_key(header::SET_COOKIE) {
                set_cookie(&mut response, &session_cookie(&token, timeout_minutes));
            }
            response
        }
        SessionStatus::Expired => login_redirect(&state, true).await,
        SessionStatus::Unknown => login_redirect(&state, false).await,
    }
}

async fn login_redirect(state: &AppState, clear_cookie: bool) -> Response {
    let target = if state.auth().is_configured().await {
        "/login.html"
    } else {
        "/login.html?init=true"
    };
    let mut response = (StatusCode::FOUND, [(header::LOCATION, target)]).into_response();
    if clear_cookie {
        set_cookie(&mut response, &clear_session_cookie());
    }
    response
}

/// Appends a `Set-Cookie` header.
pub(crate) fn set_cookie(response: &mut Response, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            response.headers_mut().append(header::SET_COOKIE, v);
        }
        Err(e) => warn!(error = %e, "Unencodable cookie dropped"),
    }
}
