//! Cache-wrapped rendering.
//!
//! Lookups go to the [`RenderCache`] first; misses are rendered by the
//! [`KrokiClient`] and stored. Concurrent misses for the same key share one
//! in-flight render instead of each calling the engine.
//!
//! The service owns the artifact files under its output directory: when the
//! cache evicts, prunes or clears an entry, the file is deleted too.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::cache::{
    create_cache_entry, generate_key, CacheDebugInfo, CacheEntry, CacheStats, RenderCache,
    RenderingOutput,
};
use crate::config::Config;
use crate::error::{RenderError, Result};
use crate::render::client::{HealthReport, KrokiClient};
use crate::render::formats::{FormatRegistry, OutputFormat};

type InFlightRender = Shared<BoxFuture<'static, Result<RenderingOutput>>>;

/// A rendered artifact and whether it came from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub output: RenderingOutput,
    pub cached: bool,
}

// == Render Service ==
pub struct RenderService {
    cache: Arc<RwLock<RenderCache>>,
    client: Arc<KrokiClient>,
    output_dir: PathBuf,
    /// Cache key -> render currently running for it
    in_flight: Arc<Mutex<HashMap<String, InFlightRender>>>,
}

impl RenderService {
    pub fn new(cache: RenderCache, client: KrokiClient, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            client: Arc::new(client),
            output_dir: output_dir.into(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Builds the cache, the default format registry and the client from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = KrokiClient::new(
            config.client_config(),
            Arc::new(FormatRegistry::with_defaults()),
        )?;
        let cache = RenderCache::new(config.cache_max_entries, config.cache_max_bytes);
        Ok(Self::new(cache, client, config.output_dir.clone()))
    }

    /// Shared handle to the cache.
    pub fn cache(&self) -> Arc<RwLock<RenderCache>> {
        self.cache.clone()
    }

    pub fn client(&self) -> &KrokiClient {
        &self.client
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    // == Render ==
    /// Returns the artifact for `(code, format, output_format)`, rendering it
    /// on a cache miss.
    ///
    /// Without an explicit output format the format's default output is used.
    /// Failed renders are not cached.
    pub async fn render(
        &self,
        code: &str,
        format: &str,
        output_format: Option<&str>,
    ) -> Result<RenderOutcome> {
        let format = format.trim().to_ascii_lowercase();
        let output = self.resolve_output(&format, output_format)?;
        let key = generate_key(code, &format, output.as_str());

        let pending = {
            let mut in_flight = self.in_flight.lock().await;

            if let Some(entry) = self.cache.write().await.get(&key) {
                debug!("Cache hit for {} diagram ({})", format, key);
                return Ok(RenderOutcome {
                    output: entry.data,
                    cached: true,
                });
            }

            match in_flight.get(&key) {
                Some(existing) => {
                    debug!("Joining in-flight render for {}", key);
                    existing.clone()
                }
                None => {
                    debug!("Cache miss for {} diagram ({})", format, key);
                    let render = self.start_render(key.clone(), code, format, output);
                    in_flight.insert(key, render.clone());
                    render
                }
            }
        };

        pending.await.map(|output| RenderOutcome {
            output,
            cached: false,
        })
    }

    fn resolve_output(&self, format: &str, output_format: Option<&str>) -> Result<OutputFormat> {
        let requested = match output_format.map(str::trim).filter(|s| !s.is_empty()) {
            Some(requested) => requested.to_string(),
            None => self
                .client
                .formats()
                .default_output_format(format)
                .ok_or_else(|| RenderError::UnknownFormat(format.to_string()))?
                .as_str()
                .to_string(),
        };
        self.client.resolve(format, &requested).map(|(_, output)| output)
    }

    /// Spawns the render as its own task, so it finishes even if every caller
    /// goes away. The task stores the result in the cache on success and
    /// always removes itself from the in-flight map.
    fn start_render(
        &self,
        key: String,
        code: &str,
        format: String,
        output: OutputFormat,
    ) -> InFlightRender {
        let client = self.client.clone();
        let cache = self.cache.clone();
        let in_flight = self.in_flight.clone();
        let output_dir = self.output_dir.clone();
        let code = code.to_string();
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            let key = task_key;
            let result: Result<RenderingOutput> = async {
                tokio::fs::create_dir_all(&output_dir)
                    .await
                    .map_err(|e| RenderError::Filesystem {
                        path: output_dir.display().to_string(),
                        message: e.to_string(),
                    })?;

                let destination = output_dir.join(format!("{}.{}", key, output.extension()));
                let rendered = client
                    .render(&code, &format, output.as_str(), &destination)
                    .await?;

                let mut cache = cache.write().await;
                let evicted = cache.set(key.clone(), create_cache_entry(rendered.clone()));
                remove_artifacts(&evicted, Some(&rendered.file_path)).await;
                Ok(rendered)
            }
            .await;

            in_flight.lock().await.remove(&key);
            result
        });

        let in_flight = self.in_flight.clone();
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    in_flight.lock().await.remove(&key);
                    Err(RenderError::Internal(format!("Render task failed: {}", e)))
                }
            }
        }
        .boxed()
        .shared()
    }

    // == Cache Maintenance ==
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Empties the cache and returns how many entries were dropped.
    pub async fn clear(&self) -> usize {
        let mut cache = self.cache.write().await;
        let dropped = cache.drain();
        remove_artifacts(&dropped, None).await;
        dropped.len()
    }

    /// Drops entries older than `max_age_ms` along with their files.
    pub async fn prune_expired(&self, max_age_ms: u64) -> usize {
        let mut cache = self.cache.write().await;
        let expired = cache.drain_expired(max_age_ms);
        remove_artifacts(&expired, None).await;
        expired.len()
    }

    pub async fn debug_info(&self) -> CacheDebugInfo {
        self.cache.read().await.debug_info()
    }

    pub async fn health_check(&self) -> HealthReport {
        self.client.health_check().await
    }

    /// Number of renders currently running.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

/// Deletes the files behind dropped cache entries, except `keep`.
///
/// Callers hold the cache write lock, so a re-render of the same key cannot
/// write its file before the old one is gone.
async fn remove_artifacts(entries: &[CacheEntry], keep: Option<&str>) {
    for entry in entries {
        let path = &entry.data.file_path;
        if keep == Some(path.as_str()) {
            continue;
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("Removed artifact {}", path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove artifact {}: {}", path, e),
        }
    }
}
