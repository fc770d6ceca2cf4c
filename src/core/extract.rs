// src/core/extract.rs
//! Ordered extraction over loosely-shaped JSON.
//!
//! Endpoints disagree on where they put things (token, record list, page count).
//! Each convention is a plain `fn(&Value) -> Option<T>`; callers list them in
//! priority order and the first hit wins.

use serde_json::Value;

pub type Strategy<T> = fn(&Value) -> Option<T>;

/// A strategy with a label, for logging which convention matched.
pub type Named<T> = (&'static str, Strategy<T>);

pub fn first_match<T>(value: &Value, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|s| s(value))
}

pub fn first_named<T>(value: &Value, strategies: &[Named<T>]) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|(name, s)| s(value).map(|v| (*name, v)))
}

/// Walk object keys, e.g. `at(v, &["data", "datas"])`.
pub fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

/// Non-empty string at `path`.
pub fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    at(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-negative count from a number or a numeric string ("3", "3.0").
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)
            })
        }
        _ => None,
    }
}

pub fn count_at(value: &Value, path: &[&str]) -> Option<u64> {
    at(value, path).and_then(as_count)
}

/// Text rendering of a scalar cell. Null and nested values yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
