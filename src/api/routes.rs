//! API Routes
//!
//! Configures the Axum router with all rendering service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, debug_handler, health_handler, prune_handler, render_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /render` - Render a diagram (cached)
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Rendering engine health
/// - `DELETE /cache` - Drop all cached renders
/// - `POST /cache/prune` - Drop renders older than `max_age_ms`
/// - `GET /cache/debug` - Recency list walk
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/render", post(render_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/prune", post(prune_handler))
        .route("/cache/debug", get(debug_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
