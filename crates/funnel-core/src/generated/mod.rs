use crate::FunnelConfig;
use serde_json::Value;
use std::sync::OnceLock;

static DEFAULT_SERIES_CONFIG: OnceLock<Value> = OnceLock::new();

fn default_series_table() -> &'static Value {
    DEFAULT_SERIES_CONFIG.get_or_init(|| {
        let json_text = include_str!("default_config.json");
        serde_json::from_str(json_text).expect("generated default config JSON is valid")
    })
}

/// Default options for a series type, with derived series already merged onto their base.
///
/// The pyramid is a funnel without a neck and reversed by default.
pub fn default_series_config(series_type: &str) -> Option<FunnelConfig> {
    let table = default_series_table();
    let own = table.get(series_type)?;
    let mut cfg = match series_type {
        "funnel" => FunnelConfig::empty_object(),
        _ => FunnelConfig::from_value(table.get("funnel")?.clone()),
    };
    cfg.deep_merge(own);
    Some(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyramid_inherits_funnel_defaults() {
        let pyramid = default_series_config("pyramid").unwrap();
        assert_eq!(pyramid.get_str("width"), Some("90%"));
        assert_eq!(pyramid.get_str("neckWidth"), Some("0%"));
        assert_eq!(pyramid.get_str("neckHeight"), Some("0%"));
        assert_eq!(pyramid.get_bool("reversed"), Some(true));
        assert_eq!(pyramid.get_f64("dataLabels.distance"), Some(30.0));
    }

    #[test]
    fn unknown_series_has_no_defaults() {
        assert!(default_series_config("pie").is_none());
    }
}
