//! Request DTOs for the rendering API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::DEFAULT_MAX_AGE_MS;

/// Largest diagram source accepted, in bytes.
pub const MAX_SOURCE_LENGTH: usize = 100_000;

/// Request body for POST /render
///
/// # Fields
/// - `code`: Diagram source text
/// - `format`: Diagram format id, e.g. `mermaid`
/// - `output_format`: `svg` or `png`; the format's default when omitted
#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    pub code: String,
    pub format: String,
    #[serde(default)]
    pub output_format: Option<String>,
}

impl RenderRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.code.trim().is_empty() {
            return Some("Diagram code cannot be empty".to_string());
        }
        if self.code.len() > MAX_SOURCE_LENGTH {
            return Some(format!(
                "Diagram code exceeds maximum length of {} bytes",
                MAX_SOURCE_LENGTH
            ));
        }
        if self.format.trim().is_empty() {
            return Some("Diagram format cannot be empty".to_string());
        }
        None
    }
}

/// Query string for POST /cache/prune
#[derive(Debug, Clone, Deserialize)]
pub struct PruneRequest {
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: u64,
}

impl Default for PruneRequest {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
        }
    }
}

fn default_max_age_ms() -> u64 {
    DEFAULT_MAX_AGE_MS
}
