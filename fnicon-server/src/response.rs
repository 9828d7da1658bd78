//! JSON response envelope and handler errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fnicon_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::apply::ApplyError;

// ============================================================================
// Envelope
// ============================================================================

/// `{success, message?, data?}` body shared by all API endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success carrying `data`.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// Success carrying only a message.
    pub fn done(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: None,
        })
    }

    /// Failure carrying a message.
    pub fn failure(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            message: Some(message.into()),
            data: None,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Store failure; status depends on the variant.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Apply-settings failure.
    #[error("Applying settings failed: {0}")]
    Apply(#[from] ApplyError),

    /// Authentication failed.
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(e) if e.is_persistence() => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(StoreError::PasswordNotSet) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Store(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Apply(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        } else {
            warn!(status = %status, error = %message, "Request rejected");
        }
        (status, ApiResponse::failure(message)).into_response()
    }
}
