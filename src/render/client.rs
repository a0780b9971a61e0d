//! Kroki rendering client.
//!
//! Resolves a diagram format through the injected [`FormatCapabilityLookup`],
//! posts the source to `{base_url}/{remote_format}/{output}`, retries
//! transient failures with backoff and writes the image to disk.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::cache::RenderingOutput;
use crate::config::DEFAULT_KROKI_URL;
use crate::error::{RenderError, Result};
use crate::render::formats::{FormatCapabilityLookup, OutputFormat};
use crate::render::retry::{with_retry, RetryConfig};

/// Longest engine error message carried into a [`RenderError`].
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Connection settings for the rendering engine.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Engine base URL, e.g. `https://kroki.io`
    pub base_url: String,
    /// Hard timeout for each HTTP attempt
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_KROKI_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

// == Health Report ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of probing the rendering engine.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Human-readable findings
    pub details: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

// == Kroki Client ==
/// HTTP client for a Kroki-compatible rendering engine.
///
/// The client does not cache; see [`crate::render::RenderService`].
#[derive(Clone)]
pub struct KrokiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
    formats: Arc<dyn FormatCapabilityLookup>,
}

impl std::fmt::Debug for KrokiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrokiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl KrokiClient {
    /// Creates a client for `config.base_url`.
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be built.
    pub fn new(config: ClientConfig, formats: Arc<dyn FormatCapabilityLookup>) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            RenderError::InvalidRequest(format!(
                "Invalid rendering engine URL '{}': {}",
                base_url, e
            ))
        })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RenderError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            timeout: config.timeout,
            retry: config.retry,
            formats,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn formats(&self) -> &Arc<dyn FormatCapabilityLookup> {
        &self.formats
    }

    // == Resolve ==
    /// Maps an internal format and requested output to the engine's format id.
    ///
    /// Never touches the network.
    pub fn resolve(&self, internal_format: &str, output_format: &str) -> Result<(String, OutputFormat)> {
        let remote = self
            .formats
            .remote_format(internal_format)
            .ok_or_else(|| RenderError::UnknownFormat(internal_format.to_string()))?;

        let supported = self.formats.supported_output_formats(internal_format);
        let unsupported = || RenderError::UnsupportedOutput {
            format: internal_format.to_string(),
            output: output_format.to_string(),
            supported: supported
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        };

        let output: OutputFormat = output_format.parse().map_err(|_| unsupported())?;
        if !supported.contains(&output) {
            return Err(unsupported());
        }

        Ok((remote, output))
    }

    pub fn render_url(&self, remote_format: &str, output: OutputFormat) -> String {
        format!("{}/{}/{}", self.base_url, remote_format, output.as_str())
    }

    // == Render ==
    /// Renders `code` and writes the image to `destination`.
    ///
    /// The parent directory of `destination` must already exist.
    pub async fn render(
        &self,
        code: &str,
        internal_format: &str,
        output_format: &str,
        destination: &Path,
    ) -> Result<RenderingOutput> {
        let (remote, output) = self.resolve(internal_format, output_format)?;
        let url = self.render_url(&remote, output);
        let operation = format!("render {}/{}", remote, output);

        debug!("Rendering {} bytes of {} source via {}", code.len(), internal_format, url);

        let url = url.as_str();
        let bytes = with_retry(&self.retry, move |_| self.fetch(url, code), &operation).await?;

        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|e| RenderError::Filesystem {
                path: destination.display().to_string(),
                message: e.to_string(),
            })?;

        info!(
            "Rendered {} diagram to {} ({} bytes)",
            internal_format,
            destination.display(),
            bytes.len()
        );

        Ok(RenderingOutput {
            file_path: destination.display().to_string(),
            resource_uri: resource_uri(destination),
            content_type: output.content_type().to_string(),
            file_size: bytes.len() as u64,
        })
    }

    /// One HTTP attempt.
    async fn fetch(&self, url: &str, code: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(code.to_string())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
            if body.is_empty() {
                return Err(RenderError::Engine {
                    status: status.as_u16(),
                    message: "engine returned an empty body".to_string(),
                });
            }
            return Ok(body.to_vec());
        }

        let message = engine_message(response.text().await.unwrap_or_default(), status);
        if is_transient_status(status) {
            Err(RenderError::EngineUnavailable {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(RenderError::Engine {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> RenderError {
        if err.is_timeout() {
            RenderError::Timeout(self.timeout.as_millis() as u64)
        } else {
            RenderError::Network(err.to_string())
        }
    }

    // == Health Check ==
    /// Probes `{base_url}/health`; healthy only on a 2xx within the timeout.
    pub async fn health_check(&self) -> HealthReport {
        let url = format!("{}/health", self.base_url);
        let started = Instant::now();
        let mut details = vec![format!("Rendering engine: {}", self.base_url)];

        let status = match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                details.push(format!(
                    "Health endpoint returned HTTP {} in {} ms",
                    response.status().as_u16(),
                    started.elapsed().as_millis()
                ));
                HealthStatus::Healthy
            }
            Ok(response) => {
                details.push(format!(
                    "Health endpoint returned HTTP {}",
                    response.status().as_u16()
                ));
                HealthStatus::Unhealthy
            }
            Err(err) => {
                details.push(format!("Health check failed: {}", self.transport_error(err)));
                HealthStatus::Unhealthy
            }
        };

        debug!("Rendering engine health: {:?}", status);
        HealthReport { status, details }
    }
}

/// 408, 429 and 5xx are worth retrying; everything else is the diagram's fault.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn engine_message(body: String, status: StatusCode) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// `file://` URI for an artifact path.
pub fn resource_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("file://{}", path.display()))
}
