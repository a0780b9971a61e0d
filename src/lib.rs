//! Diagram Cache - Cached diagram rendering through Kroki
//!
//! Renders diagram source (Mermaid, PlantUML, D2, GraphViz, ...) to PNG or
//! SVG via an external Kroki engine, keeping results in an LRU cache bounded
//! by entry count and total bytes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod tasks;

pub use api::AppState;
pub use cache::{generate_key, CacheEntry, RenderCache, RenderingOutput};
pub use config::Config;
pub use error::{RenderError, Result};
pub use render::{FormatCapabilityLookup, FormatRegistry, KrokiClient, RenderService};
pub use tasks::spawn_prune_task;
