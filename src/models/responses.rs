//! Response DTOs for the rendering API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::render::{HealthReport, HealthStatus, RenderOutcome};

/// Response body for POST /render
#[derive(Debug, Clone, Serialize)]
pub struct RenderResponse {
    pub file_path: String,
    pub resource_uri: String,
    pub content_type: String,
    pub file_size: u64,
    /// True when served from the cache without calling the engine
    pub cached: bool,
}

impl From<RenderOutcome> for RenderResponse {
    fn from(outcome: RenderOutcome) -> Self {
        Self {
            file_path: outcome.output.file_path,
            resource_uri: outcome.output.resource_uri,
            content_type: outcome.output.content_type,
            file_size: outcome.output.file_size,
            cached: outcome.cached,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Current number of cached renders
    pub size: usize,
    /// Hit percentage, two decimals
    pub hit_rate: f64,
    /// Bytes charged against the memory budget
    pub memory_usage: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub max_entries: usize,
    pub max_bytes: u64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics and limits
    pub fn new(stats: &CacheStats, max_entries: usize, max_bytes: u64) -> Self {
        Self {
            size: stats.size,
            hit_rate: stats.hit_rate(),
            memory_usage: stats.memory_usage,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            max_entries,
            max_bytes,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: HealthStatus,
    pub details: Vec<String>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl From<HealthReport> for HealthResponse {
    fn from(report: HealthReport) -> Self {
        Self {
            status: report.status,
            details: report.details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for POST /cache/prune
#[derive(Debug, Clone, Serialize)]
pub struct PruneResponse {
    pub removed: usize,
    pub max_age_ms: u64,
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries dropped by the clear
    pub cleared: usize,
}

impl ClearResponse {
    pub fn new(cleared: usize) -> Self {
        Self {
            message: format!("Cache cleared ({} entries removed)", cleared),
            cleared,
        }
    }
}
