//! Mapping provider JSON onto `SearchResult`.

use serde_json::Value;
use sift_core::{HitFields, SearchResult};

use super::ProviderError;
use crate::fetch::url::is_absolute_http;

/// Walk a dotted path (`web.results`) to the hit array.
///
/// A missing segment means the backend had nothing to say and yields an empty
/// slice. A value that is present but not an array is a shape error.
pub fn results_at<'a>(body: &'a Value, path: &str) -> Result<&'a [Value], ProviderError> {
    let mut node = body;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        match node.get(segment) {
            Some(next) => node = next,
            None => return Ok(&[]),
        }
    }

    match node {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(&[]),
        other => Err(ProviderError::Parse(format!("`{}` is {}, expected an array", path, kind(other)))),
    }
}

/// Map raw hits to canonical results, keeping at most `limit`.
///
/// Hits without an absolute http(s) URL are dropped one by one; missing title
/// or snippet fall back to the placeholders.
pub fn map_hits(items: &[Value], fields: &HitFields, limit: usize) -> Vec<SearchResult> {
    items
        .iter()
        .filter_map(|hit| {
            let url = first_string(hit, &fields.url).filter(|u| is_absolute_http(u))?;
            Some(SearchResult::new(first_string(hit, &fields.title), url, first_string(hit, &fields.snippet)))
        })
        .take(limit)
        .collect()
}

fn first_string(hit: &Value, keys: &[String]) -> Option<String> {
    keys.iter()
        .filter_map(|key| hit.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
