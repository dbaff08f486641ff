pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Upload page
        .route(
            "/",
            get(handlers::handle_index).post(handlers::handle_upload_page),
        )
        // Resume API
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze))
        .route("/api/v1/resume/text", post(handlers::handle_download_text))
        // Uploads are not size-limited.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
