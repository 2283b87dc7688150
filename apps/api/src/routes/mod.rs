pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::generation::handlers;
use crate::state::AppState;

/// Request body cap for post generation. Context images travel base64-encoded
/// inside the JSON, so this sits well above axum's 2 MB default.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        .route(
            "/api/v1/posts/generate",
            post(handlers::handle_generate_posts).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .fallback(not_found)
        .with_state(state)
}
