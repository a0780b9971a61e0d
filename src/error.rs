//! Error types for the rendering service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Render Error Enum ==
/// Unified error type for rendering and caching.
///
/// Payloads are plain strings so a single failed render can be handed to
/// every caller waiting on the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Diagram format is not known to the format registry
    #[error("Unsupported diagram format: {0}")]
    UnknownFormat(String),

    /// Output format is not offered for this diagram format
    #[error("Output format '{output}' is not supported for '{format}' (supported: {supported})")]
    UnsupportedOutput {
        format: String,
        output: String,
        supported: String,
    },

    /// Transport failure (connection refused, DNS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// A single attempt exceeded the request timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Engine answered with a transient status (408, 429, 5xx)
    #[error("Rendering engine unavailable (HTTP {status}): {message}")]
    EngineUnavailable { status: u16, message: String },

    /// Engine rejected the diagram source
    #[error("Rendering failed (HTTP {status}): {message}")]
    Engine { status: u16, message: String },

    /// Every attempt failed with a retryable error
    #[error("Rendering failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Writing the rendered artifact failed
    #[error("Failed to write {path}: {message}")]
    Filesystem { path: String, message: String },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RenderError {
    /// Whether the same request may succeed if issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RenderError::Network(_) | RenderError::Timeout(_) | RenderError::EngineUnavailable { .. }
        )
    }

    /// Whether the failure came from resolving the diagram or output format.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            RenderError::UnknownFormat(_) | RenderError::UnsupportedOutput { .. }
        )
    }

    /// Short machine-readable category used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::UnknownFormat(_) | RenderError::UnsupportedOutput { .. } => "format",
            RenderError::Network(_)
            | RenderError::Timeout(_)
            | RenderError::EngineUnavailable { .. }
            | RenderError::RetriesExhausted { .. } => "network",
            RenderError::Engine { .. } => "engine",
            RenderError::Filesystem { .. } => "filesystem",
            RenderError::InvalidRequest(_) => "invalid_request",
            RenderError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            RenderError::UnknownFormat(_)
            | RenderError::UnsupportedOutput { .. }
            | RenderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RenderError::Network(_)
            | RenderError::EngineUnavailable { .. }
            | RenderError::RetriesExhausted { .. } => StatusCode::BAD_GATEWAY,
            RenderError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RenderError::Engine { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RenderError::Filesystem { .. } | RenderError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (self.status_code(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the rendering service.
pub type Result<T> = std::result::Result<T, RenderError>;
