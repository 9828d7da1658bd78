//! Catalog endpoints.

use axum::{Json, extract::State};
use fnicon_core::{CatalogRecord, RecordPatch};
use serde::Deserialize;

use crate::extract::{ApiJson, ApiPath};
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Body of the reorder endpoint.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Sequence numbers in their new order.
    pub order: Vec<u32>,
}

/// `GET /api/files`
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::ok(state.service.list().await?))
}

/// `GET /api/files/{name}`
pub async fn read(State(state): State<AppState>, ApiPath(name): ApiPath<String>) -> ApiResult<Vec<CatalogRecord>> {
    Ok(ApiResponse::ok(state.service.read(&name).await?))
}

/// `POST /api/files/{name}`
pub async fn create(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(patch): ApiJson<RecordPatch>,
) -> ApiResult<CatalogRecord> {
    Ok(ApiResponse::ok(state.service.create(&name, patch).await?))
}

/// `PUT /api/files/{name}/{seq}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath((name, seq)): ApiPath<(String, u32)>,
    ApiJson(patch): ApiJson<RecordPatch>,
) -> ApiResult<CatalogRecord> {
    Ok(ApiResponse::ok(state.service.update(&name, seq, patch).await?))
}

/// `DELETE /api/files/{name}/{seq}`
pub async fn delete(
    State(state): State<AppState>,
    ApiPath((name, seq)): ApiPath<(String, u32)>,
) -> ApiResult<CatalogRecord> {
    Ok(ApiResponse::ok(state.service.delete(&name, seq).await?))
}

/// `POST /api/files/{name}/reorder`
pub async fn reorder(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> ApiResult<Vec<CatalogRecord>> {
    Ok(ApiResponse::ok(state.service.reorder(&name, &request.order).await?))
}
