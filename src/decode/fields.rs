//! Field lookup with named fallback sources
//!
//! Remote payloads spell the same datum differently across endpoints
//! (`v1_page` vs `page_number`, `juz_number` vs `juz.number`). Readers take
//! an ordered list of dot paths and return the first non-null hit.

use serde_json::Value;

/// Resolve a dot path such as `juz.number`
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => current.get(part)?,
        };
    }
    Some(current)
}

/// First non-null value among `paths`
pub fn first<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find(|v| !v.is_null())
}

/// First value convertible to `u64`; numeric strings are accepted
pub fn first_u64(value: &Value, paths: &[&str]) -> Option<u64> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(as_u64_lenient)
}

/// First value convertible to `u32`
pub fn first_u32(value: &Value, paths: &[&str]) -> Option<u32> {
    first_u64(value, paths).and_then(|n| u32::try_from(n).ok())
}

/// First non-empty string; numbers are rendered
pub fn first_string(value: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Non-negative integer from a number or numeric string; floats are truncated
pub fn as_u64_lenient(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-null value at `path`, cloned
pub fn cloned(value: &Value, path: &str) -> Option<Value> {
    lookup(value, path).filter(|v| !v.is_null()).cloned()
}
