//! Render Module
//!
//! Everything between a render request and an image on disk: format
//! capabilities, the Kroki HTTP client with retry, and the cache-wrapped
//! service that ties them to the [`crate::cache::RenderCache`].

mod client;
mod formats;
mod retry;
mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{resource_uri, ClientConfig, HealthReport, HealthStatus, KrokiClient};
pub use formats::{FormatCapabilityLookup, FormatMapping, FormatRegistry, OutputFormat};
pub use retry::{with_retry, RetryConfig};
pub use service::{RenderOutcome, RenderService};
