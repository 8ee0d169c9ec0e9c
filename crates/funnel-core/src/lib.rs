#![forbid(unsafe_code)]

//! Funnel/pyramid chart input model (headless).
//!
//! Design goals:
//! - accept loosely typed JSON documents (bare numbers, percentage strings) without failing on
//!   merely odd numeric input
//! - deterministic, testable outputs: a normalized semantic model plus the effective options
//! - no I/O and no executor; everything here is plain synchronous data transformation

pub mod config;
pub mod detect;
pub mod document;
pub mod error;
pub mod generated;
pub mod size;

pub use config::FunnelConfig;
pub use detect::{DetectTypeError, SeriesRegistry};
pub use error::{Error, Result};
pub use size::SizeSpec;

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ParseMetadata {
    pub series_type: String,
    /// Option overrides exactly as given by the document's `options` object.
    pub config: FunnelConfig,
    /// Series defaults, then site config, then document overrides.
    pub effective_config: FunnelConfig,
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedFunnel {
    pub meta: ParseMetadata,
    pub model: Value,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    registry: SeriesRegistry,
    site_config: FunnelConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options applied to every series on top of its defaults (and below document options).
    pub fn with_site_config(mut self, site_config: FunnelConfig) -> Self {
        self.site_config.deep_merge(site_config.as_value());
        self
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SeriesRegistry {
        &mut self.registry
    }

    /// Parses a JSON funnel document.
    pub fn parse_document_sync(&self, text: &str) -> Result<ParsedFunnel> {
        let document: Value = serde_json::from_str(text)?;
        self.parse_value(&document)
    }

    pub fn parse_value(&self, document: &Value) -> Result<ParsedFunnel> {
        if !document.is_object() {
            return Err(Error::InvalidDocument {
                message: "expected a JSON object at the document root".to_string(),
            });
        }

        let meta = self.metadata_for(document)?;
        let model = document::parse_funnel_document(document, &meta)?;
        Ok(ParsedFunnel { meta, model })
    }

    fn metadata_for(&self, document: &Value) -> Result<ParseMetadata> {
        let series_type = self.registry.detect_type(document)?;

        let overrides = match document.get("options") {
            None | Some(Value::Null) => FunnelConfig::empty_object(),
            Some(v @ Value::Object(_)) => FunnelConfig::from_value(v.clone()),
            Some(_) => {
                return Err(Error::InvalidDocument {
                    message: "`options` must be an object".to_string(),
                });
            }
        };

        let mut effective_config = generated::default_series_config(series_type)
            .ok_or_else(|| Error::UnsupportedSeries {
                series_type: series_type.to_string(),
            })?;
        effective_config.deep_merge(self.site_config.as_value());
        effective_config.deep_merge(overrides.as_value());

        let title = document
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(ParseMetadata {
            series_type: series_type.to_string(),
            config: overrides,
            effective_config,
            title,
        })
    }
}

#[cfg(test)]
mod tests;
