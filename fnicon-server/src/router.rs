//! HTTP routes.

use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use fnicon_store::PASSWORD_FILE;
use percent_encoding::percent_decode_str;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::api::{auth, files, settings};
use crate::gate::require_session;
use crate::state::AppState;

/// Builds the application router.
///
/// Everything, static files included, passes through the session gate.
/// The password file is never served even though it lives under the
/// public directory.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/init-password", post(auth::init_password))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/files", get(files::list))
        .route("/files/{name}", get(files::read).post(files::create))
        .route("/files/{name}/reorder", post(files::reorder))
        .route("/files/{name}/{seq}", put(files::update).delete(files::delete))
        .route("/apply-settings", post(settings::apply));

    let static_files = Router::new()
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(middleware::from_fn(hide_password_file));

    Router::new()
        .nest("/api", api)
        .fallback_service(static_files)
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answers 404 for any static path that would resolve to the password file.
async fn hide_password_file(request: Request, next: Next) -> Response {
    if names_password_file(request.uri().path()) {
        warn!(path = %request.uri().path(), "Refused to serve password file");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

/// Returns true if any segment of the decoded `path` is the password file.
///
/// Compared case-insensitively so case-folding filesystems are covered.
fn names_password_file(path: &str) -> bool {
    percent_decode_str(path)
        .decode_utf8_lossy()
        .split(['/', '\\'])
        .any(|segment| segment.eq_ignore_ascii_case(PASSWORD_FILE))
}
