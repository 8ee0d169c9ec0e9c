use crate::{Error, ParseMetadata, Result};
use serde_json::{Map, Value, json};

/// Normalizes the `data` array of a funnel document into the semantic model.
///
/// Points may be bare numbers or objects with `value` (or `y`), optional `visible` and optional
/// `name`. The returned model always has the long form so layout code sees one shape.
pub fn parse_funnel_document(document: &Value, meta: &ParseMetadata) -> Result<Value> {
    let data = match document.get("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| normalize_point(i, item, meta))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(Error::InvalidDocument {
                message: "`data` must be an array".to_string(),
            });
        }
    };

    tracing::debug!(
        series_type = %meta.series_type,
        points = data.len(),
        "parsed funnel document"
    );

    Ok(json!({
        "type": meta.series_type,
        "title": meta.title,
        "data": data,
    }))
}

fn normalize_point(index: usize, item: &Value, meta: &ParseMetadata) -> Result<Value> {
    let invalid = |what: &str| Error::InvalidDocument {
        message: format!("{} point {index}: {what}", meta.series_type),
    };

    match item {
        Value::Number(n) => {
            let value = n.as_f64().ok_or_else(|| invalid("value is not a finite number"))?;
            Ok(json!({ "value": value, "visible": true, "name": null }))
        }
        Value::Object(obj) => {
            let value = point_value(obj).ok_or_else(|| invalid("missing numeric `value`"))?;
            let visible = match obj.get("visible") {
                None | Some(Value::Null) => true,
                Some(Value::Bool(b)) => *b,
                Some(_) => return Err(invalid("`visible` must be a boolean")),
            };
            let name = match obj.get("name") {
                None | Some(Value::Null) => Value::Null,
                Some(Value::String(s)) => Value::String(s.clone()),
                Some(other) => Value::String(other.to_string()),
            };
            Ok(json!({ "value": value, "visible": visible, "name": name }))
        }
        _ => Err(invalid("expected a number or an object")),
    }
}

fn point_value(obj: &Map<String, Value>) -> Option<f64> {
    obj.get("value")
        .or_else(|| obj.get("y"))
        .and_then(Value::as_f64)
}
