//! Publishing the configuration.

use axum::{Json, extract::State};

use crate::apply::apply_settings;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// `POST /api/apply-settings`
pub async fn apply(State(state): State<AppState>) -> Result<Json<ApiResponse<()>>, ApiError> {
    apply_settings(&state.config).await?;
    Ok(ApiResponse::done("Settings applied"))
}
