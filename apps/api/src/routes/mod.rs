pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::extraction::handlers as extraction;
use crate::state::AppState;

/// Transport cap for the multipart body. Set above the 5 MB file limit so an
/// oversized file still reaches the size check and gets the friendly error.
const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/extract",
            post(extraction::handle_extract).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/autofill", post(analysis::handle_autofill))
        .route("/api/v1/sample", get(analysis::handle_sample))
        .with_state(state)
}
