//! Request and Response models for the rendering API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{PruneRequest, RenderRequest, MAX_SOURCE_LENGTH};
pub use responses::{ClearResponse, HealthResponse, PruneResponse, RenderResponse, StatsResponse};
