//! API Module
//!
//! HTTP handlers and routing for the rendering service REST API.
//!
//! # Endpoints
//! - `POST /render` - Render a diagram (cached)
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Rendering engine health
//! - `DELETE /cache` - Drop all cached renders
//! - `POST /cache/prune` - Drop stale renders
//! - `GET /cache/debug` - Recency list walk

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
