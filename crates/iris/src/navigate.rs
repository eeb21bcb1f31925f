// ABOUTME: Total lookups over parsed JSON documents: fixed paths and bounded key search.
// ABOUTME: Every miss yields None; nothing here allocates beyond the search worklist.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default nesting bound for [`find_value_by_key`].
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// One step of a JSON path: an object key or an array index.
///
/// Deserializes untagged, so a path is written in data files as
/// `["entry_data", "PostPage", 0, "graphql"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathStep {
    Index(usize),
    Key(String),
}

impl PathStep {
    pub fn key(k: impl Into<String>) -> Self {
        PathStep::Key(k.into())
    }
}

impl From<&str> for PathStep {
    fn from(s: &str) -> Self {
        PathStep::Key(s.to_string())
    }
}

impl From<usize> for PathStep {
    fn from(i: usize) -> Self {
        PathStep::Index(i)
    }
}

/// Follows `path` from `value`.
///
/// Returns `None` when a key is missing, an index is out of range, a step
/// meets the wrong container kind, or the final value is `null`.
pub fn value_at_path<'a>(value: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    let mut current = value;
    for step in path {
        current = match (step, current) {
            (PathStep::Key(k), Value::Object(map)) => map.get(k)?,
            (PathStep::Index(i), Value::Array(items)) => items.get(*i)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Searches `value` for the first object carrying any of `keys`.
///
/// Traversal is depth-first pre-order in document order, driven by an
/// explicit worklist. The root sits at depth 0 and nodes deeper than
/// `max_depth` are never examined. When one object holds several candidate
/// keys, the earliest candidate in `keys` wins. `null` values do not match.
pub fn find_value_by_key<'a>(
    value: &'a Value,
    keys: &[&str],
    max_depth: usize,
) -> Option<&'a Value> {
    let mut stack: Vec<(&'a Value, usize)> = vec![(value, 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth {
            continue;
        }
        match node {
            Value::Object(map) => {
                for key in keys {
                    if let Some(found) = map.get(*key) {
                        if !found.is_null() {
                            return Some(found);
                        }
                    }
                }
                // reversed so the first child is popped first
                for child in map.values().rev() {
                    if child.is_object() || child.is_array() {
                        stack.push((child, depth + 1));
                    }
                }
            }
            Value::Array(items) => {
                for child in items.iter().rev() {
                    if child.is_object() || child.is_array() {
                        stack.push((child, depth + 1));
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Reads a string at `path`, trimmed; empty strings count as absent.
pub fn str_at_path<'a>(value: &'a Value, path: &[PathStep]) -> Option<&'a str> {
    value_at_path(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Returns the first non-empty string among the named fields of an object.
pub fn first_str<'a>(value: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields.iter().find_map(|f| {
        value
            .get(*f)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}
