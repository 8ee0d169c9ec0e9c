#![forbid(unsafe_code)]

//! Headless funnel and pyramid layout.
//!
//! Turns a parsed funnel document into segment polygons, tooltip anchors and label connectors
//! that a renderer can draw directly. See [`funnel::layout_funnel`] for the geometry itself.

pub mod funnel;
pub mod model;
pub mod svg;

use crate::model::{LayoutMeta, LayoutedFunnel};
use funnel_core::ParsedFunnel;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported series type for layout: {series_type}")]
    UnsupportedSeries { series_type: String },
    #[error("invalid semantic model: {message}")]
    InvalidModel { message: String },
    #[error("semantic model JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Plot area the series is laid out in; percentage sizes resolve against it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub plot_width: f64,
    pub plot_height: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            plot_width: 600.0,
            plot_height: 400.0,
        }
    }
}

impl LayoutOptions {
    pub fn with_plot_size(plot_width: f64, plot_height: f64) -> Self {
        Self {
            plot_width,
            plot_height,
        }
    }
}

pub fn layout_parsed(parsed: &ParsedFunnel, options: &LayoutOptions) -> Result<LayoutedFunnel> {
    let meta = LayoutMeta::from_parse_metadata(&parsed.meta);

    let layout = match parsed.meta.series_type.as_str() {
        "funnel" | "pyramid" => {
            funnel::layout_funnel_diagram(&parsed.model, &parsed.meta.effective_config, options)?
        }
        other => {
            return Err(Error::UnsupportedSeries {
                series_type: other.to_string(),
            });
        }
    };

    Ok(LayoutedFunnel {
        meta,
        semantic: Value::clone(&parsed.model),
        layout,
    })
}
