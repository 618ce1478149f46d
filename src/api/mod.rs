//! HTTP surface of the chunking service.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Build the service router with its middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Chunking
        .route("/chunk", post(handlers::chunk_text))
        .route("/chunk/batch", post(handlers::chunk_batch))
        .route("/chunk/book", post(handlers::chunk_book))
        .route("/chunk/config", get(handlers::get_config))
        // State
        .with_state(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
