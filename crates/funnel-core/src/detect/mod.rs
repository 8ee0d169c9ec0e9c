use crate::{Error, Result};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
#[error("No series type detected: expected a string `type`, found: {found}")]
pub struct DetectTypeError {
    pub found: String,
}

/// Series type assumed when a document has no `type` key.
pub const DEFAULT_SERIES_TYPE: &str = "funnel";

#[derive(Debug, Clone)]
pub struct SeriesRegistry {
    series_types: Vec<&'static str>,
}

impl Default for SeriesRegistry {
    fn default() -> Self {
        let mut reg = Self::new();
        reg.add("funnel");
        reg.add("pyramid");
        reg
    }
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self {
            series_types: Vec::new(),
        }
    }

    pub fn add(&mut self, series_type: &'static str) {
        if !self.series_types.contains(&series_type) {
            self.series_types.push(series_type);
        }
    }

    pub fn contains(&self, series_type: &str) -> bool {
        self.series_types.iter().any(|t| *t == series_type)
    }

    /// Resolves the series type of a funnel document from its `type` key.
    pub fn detect_type(&self, document: &Value) -> Result<&'static str> {
        let raw = match document.get("type") {
            None | Some(Value::Null) => DEFAULT_SERIES_TYPE,
            Some(Value::String(s)) => s.trim(),
            Some(other) => {
                return Err(DetectTypeError {
                    found: other.to_string(),
                }
                .into());
            }
        };

        self.series_types
            .iter()
            .copied()
            .find(|t| *t == raw)
            .ok_or_else(|| Error::UnsupportedSeries {
                series_type: raw.to_string(),
            })
    }
}
