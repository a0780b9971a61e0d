//! Diagram and output format capabilities.
//!
//! The rendering client never hard-codes which diagram types exist; it asks a
//! [`FormatCapabilityLookup`] supplied at construction time.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

// == Output Format ==
/// Image type produced by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(RenderError::UnsupportedOutput {
                format: String::new(),
                output: other.to_string(),
                supported: "png, svg".to_string(),
            }),
        }
    }
}

// == Capability Lookup ==
/// Answers which remote format and outputs an internal diagram format maps to.
pub trait FormatCapabilityLookup: Send + Sync {
    /// Engine-side identifier, None if the format is unknown or disabled.
    fn remote_format(&self, internal_format: &str) -> Option<String>;

    /// Outputs the engine can produce for this format; empty if unknown.
    fn supported_output_formats(&self, internal_format: &str) -> Vec<OutputFormat>;

    fn default_output_format(&self, internal_format: &str) -> Option<OutputFormat>;
}

// == Format Mapping ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatMapping {
    pub internal_format: String,
    pub remote_format: String,
    pub supported_outputs: Vec<OutputFormat>,
    pub default_output: OutputFormat,
}

impl FormatMapping {
    pub fn new(
        internal_format: impl Into<String>,
        remote_format: impl Into<String>,
        supported_outputs: &[OutputFormat],
    ) -> Self {
        let supported_outputs = supported_outputs.to_vec();
        let default_output = if supported_outputs.contains(&OutputFormat::Svg) {
            OutputFormat::Svg
        } else {
            supported_outputs.first().copied().unwrap_or(OutputFormat::Svg)
        };
        Self {
            internal_format: internal_format.into(),
            remote_format: remote_format.into(),
            supported_outputs,
            default_output,
        }
    }

    pub fn with_default(mut self, output: OutputFormat) -> Self {
        self.default_output = output;
        self
    }
}

// == Format Registry ==
/// Table-backed [`FormatCapabilityLookup`]. Lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    mappings: HashMap<String, FormatMapping>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the diagram types Kroki serves.
    pub fn with_defaults() -> Self {
        use OutputFormat::{Png, Svg};

        let both = &[Svg, Png];
        let svg_only = &[Svg];

        let mut registry = Self::new();
        for mapping in [
            FormatMapping::new("mermaid", "mermaid", both),
            FormatMapping::new("plantuml", "plantuml", both),
            FormatMapping::new("c4plantuml", "c4plantuml", both),
            FormatMapping::new("d2", "d2", svg_only),
            FormatMapping::new("graphviz", "graphviz", both),
            FormatMapping::new("dot", "graphviz", both),
            FormatMapping::new("erd", "erd", both),
            FormatMapping::new("bpmn", "bpmn", svg_only),
            FormatMapping::new("ditaa", "ditaa", both),
            FormatMapping::new("blockdiag", "blockdiag", both),
            FormatMapping::new("seqdiag", "seqdiag", both),
            FormatMapping::new("actdiag", "actdiag", both),
            FormatMapping::new("nwdiag", "nwdiag", both),
            FormatMapping::new("nomnoml", "nomnoml", svg_only),
            FormatMapping::new("excalidraw", "excalidraw", svg_only),
            FormatMapping::new("svgbob", "svgbob", svg_only),
            FormatMapping::new("pikchr", "pikchr", svg_only),
            FormatMapping::new("structurizr", "structurizr", both),
            FormatMapping::new("vega", "vega", both),
            FormatMapping::new("vegalite", "vegalite", both),
            FormatMapping::new("wavedrom", "wavedrom", svg_only),
            FormatMapping::new("wireviz", "wireviz", both),
        ] {
            registry.register(mapping);
        }
        registry
    }

    /// Adds a mapping, replacing any existing one for the same internal format.
    pub fn register(&mut self, mapping: FormatMapping) {
        self.mappings
            .insert(mapping.internal_format.to_ascii_lowercase(), mapping);
    }

    pub fn mapping(&self, internal_format: &str) -> Option<&FormatMapping> {
        self.mappings.get(&internal_format.trim().to_ascii_lowercase())
    }

    /// Registered internal format ids, sorted.
    pub fn formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self
            .mappings
            .values()
            .map(|m| m.internal_format.as_str())
            .collect();
        formats.sort_unstable();
        formats
    }
}

impl FormatCapabilityLookup for FormatRegistry {
    fn remote_format(&self, internal_format: &str) -> Option<String> {
        self.mapping(internal_format).map(|m| m.remote_format.clone())
    }

    fn supported_output_formats(&self, internal_format: &str) -> Vec<OutputFormat> {
        self.mapping(internal_format)
            .map(|m| m.supported_outputs.clone())
            .unwrap_or_default()
    }

    fn default_output_format(&self, internal_format: &str) -> Option<OutputFormat> {
        self.mapping(internal_format).map(|m| m.default_output)
    }
}
