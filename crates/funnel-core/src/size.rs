use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A length option: either an absolute number of pixels or a string such as `"90%"` / `"120"`.
///
/// Strings ending in `%` are relative to a reference extent (plot width or height). Every other
/// form is read as an integer with truncating, prefix-based parsing, so `"12.7px"` is `12`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Absolute(f64),
    Expr(String),
}

impl SizeSpec {
    pub fn percent(p: i64) -> Self {
        Self::Expr(format!("{p}%"))
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Absolute),
            Value::String(s) => Some(Self::Expr(s.clone())),
            _ => None,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Self::Expr(s) if s.ends_with('%'))
    }

    /// Resolves the length against `relative_to`.
    ///
    /// Unparseable strings resolve to `0`.
    pub fn resolve(&self, relative_to: f64) -> f64 {
        match self {
            Self::Absolute(v) if v.is_finite() => v.trunc(),
            Self::Absolute(v) => {
                tracing::warn!(value = %v, "non-finite size resolves to 0");
                0.0
            }
            Self::Expr(s) => {
                let Some(int) = parse_int_prefix(s) else {
                    tracing::warn!(spec = %s, "unparseable size resolves to 0");
                    return 0.0;
                };
                if s.ends_with('%') {
                    relative_to * int / 100.0
                } else {
                    int
                }
            }
        }
    }
}

impl From<f64> for SizeSpec {
    fn from(value: f64) -> Self {
        Self::Absolute(value)
    }
}

impl From<&str> for SizeSpec {
    fn from(value: &str) -> Self {
        Self::Expr(value.to_string())
    }
}

/// Base-10 integer prefix of `text`: leading whitespace, an optional sign, then digits.
/// Anything after the digits is ignored. Returns `None` when no digit follows the sign.
pub fn parse_int_prefix(text: &str) -> Option<f64> {
    let rest = text.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    // Accumulate in f64 so very long digit runs saturate instead of overflowing.
    let magnitude = rest[..digits_len]
        .bytes()
        .fold(0.0_f64, |acc, b| acc * 10.0 + f64::from(b - b'0'));
    Some(if negative { -magnitude } else { magnitude })
}
