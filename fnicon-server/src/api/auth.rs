//! Password initialization, login and logout.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use fnicon_store::StoreError;
use serde::Deserialize;

use crate::cookie::{clear_session_cookie, session_cookie, session_token};
use crate::extract::ApiJson;
use crate::gate::set_cookie;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// Body of the password endpoints.
#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
}

/// `POST /api/init-password`
pub async fn init_password(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.auth().initialize(&request.password).await?;
    Ok(ApiResponse::done("Password initialized"))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PasswordRequest>,
) -> Result<Response, ApiError> {
    let (session, timeout_minutes) =
        state
            .sessions
            .login(&request.password)
            .await
            .map_err(|e| match e {
                StoreError::InvalidPassword(message) => ApiError::Unauthorized(message),
                other => ApiError::Store(other),
            })?;

    let mut response = ApiResponse::done("Login successful").into_response();
    set_cookie(&mut response, &session_cookie(&session.id, timeout_minutes));
    Ok(response)
}

/// `POST /api/logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.logout(&token).await;
    }
    let mut response = ApiResponse::done("Logged out").into_response();
    set_cookie(&mut response, &clear_session_cookie());
    response
}
