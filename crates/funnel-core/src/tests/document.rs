use crate::*;
use serde_json::json;

#[test]
fn parse_document_normalizes_points() {
    let engine = Engine::new();
    let text = r#"{
        "type": "funnel",
        "title": "  Sales  ",
        "data": [
            50,
            { "value": 30, "name": "Leads" },
            { "y": 20, "visible": false }
        ]
    }"#;
    let res = engine.parse_document_sync(text).unwrap();
    assert_eq!(res.meta.title.as_deref(), Some("Sales"));
    assert_eq!(
        res.model,
        json!({
            "type": "funnel",
            "title": "Sales",
            "data": [
                { "value": 50.0, "visible": true, "name": null },
                { "value": 30.0, "visible": true, "name": "Leads" },
                { "value": 20.0, "visible": false, "name": null }
            ]
        })
    );
}

#[test]
fn negative_and_zero_values_are_accepted() {
    let engine = Engine::new();
    let res = engine
        .parse_value(&json!({ "data": [0, -5.5] }))
        .unwrap();
    assert_eq!(res.model["data"][0]["value"], json!(0.0));
    assert_eq!(res.model["data"][1]["value"], json!(-5.5));
}

#[test]
fn missing_data_is_an_empty_series() {
    let engine = Engine::new();
    let res = engine.parse_value(&json!({})).unwrap();
    assert_eq!(res.model["data"], json!([]));
}

#[test]
fn document_options_override_defaults() {
    let engine = Engine::new();
    let res = engine
        .parse_value(&json!({
            "options": { "neckWidth": 40, "dataLabels": { "position": "left" } },
            "data": [1]
        }))
        .unwrap();
    let cfg = &res.meta.effective_config;
    assert_eq!(cfg.get_f64("neckWidth"), Some(40.0));
    assert_eq!(cfg.get_str("dataLabels.position"), Some("left"));
    assert_eq!(cfg.get_f64("dataLabels.distance"), Some(30.0));
    assert_eq!(res.meta.config.get_str("width"), None);
}

#[test]
fn site_config_sits_between_defaults_and_document() {
    let engine = Engine::new().with_site_config(FunnelConfig::from_value(json!({
        "width": "80%",
        "height": "90%"
    })));
    let res = engine
        .parse_value(&json!({ "options": { "height": 200 } }))
        .unwrap();
    let cfg = &res.meta.effective_config;
    assert_eq!(cfg.get_str("width"), Some("80%"));
    assert_eq!(cfg.get_f64("height"), Some(200.0));
}

#[test]
fn malformed_documents_are_rejected() {
    let engine = Engine::new();
    assert!(matches!(
        engine.parse_value(&json!([1, 2, 3])),
        Err(Error::InvalidDocument { .. })
    ));
    assert!(matches!(
        engine.parse_value(&json!({ "data": { "value": 1 } })),
        Err(Error::InvalidDocument { .. })
    ));
    assert!(matches!(
        engine.parse_value(&json!({ "data": ["ten"] })),
        Err(Error::InvalidDocument { .. })
    ));
    assert!(matches!(
        engine.parse_value(&json!({ "data": [{ "visible": true }] })),
        Err(Error::InvalidDocument { .. })
    ));
    assert!(matches!(
        engine.parse_value(&json!({ "options": "wide" })),
        Err(Error::InvalidDocument { .. })
    ));
    assert!(matches!(
        engine.parse_document_sync("{ not json"),
        Err(Error::Json(_))
    ));
}
