//! API Handlers
//!
//! HTTP request handlers for each rendering service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::CacheDebugInfo;
use crate::config::Config;
use crate::error::{RenderError, Result};
use crate::models::{
    ClearResponse, HealthResponse, PruneRequest, PruneResponse, RenderRequest, RenderResponse,
    StatsResponse,
};
use crate::render::RenderService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-wrapped rendering service
    pub service: Arc<RenderService>,
}

impl AppState {
    /// Creates a new AppState around the given service.
    pub fn new(service: RenderService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(RenderService::from_config(config)?))
    }
}

/// Handler for POST /render
///
/// Renders a diagram, or returns the cached artifact for an identical request.
pub async fn render_handler(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(RenderError::InvalidRequest(error_msg));
    }

    let outcome = state
        .service
        .render(&req.code, &req.format, req.output_format.as_deref())
        .await?;

    Ok(Json(outcome.into()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.service.cache();
    let cache = cache.read().await;

    Json(StatsResponse::new(
        &cache.stats(),
        cache.max_entries(),
        cache.max_bytes(),
    ))
}

/// Handler for GET /health
///
/// Probes the rendering engine; answers 503 when it is unreachable.
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let report = state.service.health_check().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report.into()))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.service.clear().await;
    Json(ClearResponse::new(cleared))
}

/// Handler for POST /cache/prune
pub async fn prune_handler(
    State(state): State<AppState>,
    Query(req): Query<PruneRequest>,
) -> Json<PruneResponse> {
    let removed = state.service.prune_expired(req.max_age_ms).await;
    Json(PruneResponse {
        removed,
        max_age_ms: req.max_age_ms,
    })
}

/// Handler for GET /cache/debug
pub async fn debug_handler(State(state): State<AppState>) -> Json<CacheDebugInfo> {
    Json(state.service.debug_info().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, RenderCache, RenderingOutput};
    use crate::render::test_support::{refused_url, spawn_engine, EngineBehavior};
    use crate::render::{ClientConfig, FormatRegistry, KrokiClient, RetryConfig};
    use std::time::Duration;

    fn state(base_url: &str, dir: &std::path::Path) -> AppState {
        let client = KrokiClient::new(
            ClientConfig {
                base_url: base_url.to_string(),
                timeout: Duration::from_secs(2),
                retry: RetryConfig::none(),
            },
            Arc::new(FormatRegistry::with_defaults()),
        )
        .unwrap();
        AppState::new(RenderService::new(RenderCache::new(10, 10_000), client, dir))
    }

    fn request(code: &str, format: &str) -> RenderRequest {
        RenderRequest {
            code: code.to_string(),
            format: format.to_string(),
            output_format: None,
        }
    }

    #[tokio::test]
    async fn test_render_handler() {
        let engine = spawn_engine(EngineBehavior::Ok).await;
        let dir = tempfile::tempdir().unwrap();
        let state = state(&engine.url, dir.path());

        let first = render_handler(State(state.clone()), Json(request("graph TD; A-->B", "mermaid")))
            .await
            .unwrap();
        assert!(!first.cached);

        let second = render_handler(State(state), Json(request("graph TD; A-->B", "mermaid")))
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.file_path, first.file_path);
    }

    #[tokio::test]
    async fn test_render_handler_rejects_empty_code() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&refused_url(), dir.path());

        let result = render_handler(State(state), Json(request("", "mermaid"))).await;
        assert!(matches!(result, Err(RenderError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&refused_url(), dir.path());

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.hit_rate, 0.0);
        assert_eq!(response.max_entries, 10);
    }

    #[tokio::test]
    async fn test_health_handler_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&refused_url(), dir.path());

        let (status, body) = health_handler(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.details.is_empty());
    }

    #[tokio::test]
    async fn test_clear_prune_and_debug_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&refused_url(), dir.path());

        let artifact = dir.path().join("k.svg");
        {
            let cache = state.service.cache();
            let mut cache = cache.write().await;
            cache.set(
                "k".to_string(),
                CacheEntry::with_timestamp(
                    RenderingOutput {
                        file_path: artifact.display().to_string(),
                        resource_uri: crate::render::resource_uri(&artifact),
                        content_type: "image/svg+xml".to_string(),
                        file_size: 5,
                    },
                    0,
                ),
            );
        }

        let debug = debug_handler(State(state.clone())).await;
        assert_eq!(debug.entries.len(), 1);

        let pruned = prune_handler(State(state.clone()), Query(PruneRequest::default())).await;
        assert_eq!(pruned.removed, 1);

        let cleared = clear_handler(State(state)).await;
        assert_eq!(cleared.cleared, 0);
    }
}
