// ABOUTME: Media normalization: type resolution, best-candidate selection and carousel flattening.
// ABOUTME: Turns heterogeneous media nodes into NormalizedMediaItem records in source order.

//! Media normalizer.
//!
//! Media nodes come from several API generations. Display and video URLs
//! live either in direct fields or in candidate arrays with optional
//! dimensions; [`select_best`] picks the largest candidate by pixel area.

use serde_json::Value;

use crate::navigate::first_str;
use crate::result::{MediaCandidate, MediaType, NormalizedMediaItem};

/// Resolves the media type of a node.
///
/// Order: a typename string, the numeric `media_type` code, the `is_video`
/// flag, then `Image`.
pub fn resolve_media_type(node: &Value) -> MediaType {
    if let Some(name) = first_str(node, &["__typename", "typename", "type"]) {
        let lower = name.to_ascii_lowercase();
        if lower.contains("sidecar") || lower.contains("carousel") {
            return MediaType::Sidecar;
        }
        if lower.contains("video") {
            return MediaType::Video;
        }
        if lower.contains("image") {
            return MediaType::Image;
        }
    }

    match node.get("media_type").and_then(Value::as_u64) {
        Some(1) => return MediaType::Image,
        Some(2) => return MediaType::Video,
        Some(8) => return MediaType::Sidecar,
        _ => {}
    }

    if node.get("is_video").and_then(Value::as_bool) == Some(true) {
        return MediaType::Video;
    }
    MediaType::Image
}

fn dimension(entry: &Value, fields: &[&str]) -> Option<u64> {
    fields
        .iter()
        .find_map(|f| entry.get(*f).and_then(Value::as_u64))
}

/// Reads candidate entries from an array; entries without a URL are skipped.
pub fn candidates_from(value: &Value) -> Vec<MediaCandidate> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let url = first_str(entry, &["url", "src"])?;
            Some(MediaCandidate {
                url: url.to_string(),
                width: dimension(entry, &["width", "config_width"]),
                height: dimension(entry, &["height", "config_height"]),
            })
        })
        .collect()
}

/// Picks the candidate with the largest pixel area.
///
/// Only a strictly larger area replaces the current best, so ties and
/// all-dimensionless lists resolve to the first candidate.
pub fn select_best(candidates: &[MediaCandidate]) -> Option<&MediaCandidate> {
    let mut best: Option<&MediaCandidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.area() <= current.area() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

fn best_url(value: Option<&Value>) -> Option<String> {
    let candidates = candidates_from(value?);
    select_best(&candidates).map(|c| c.url.clone())
}

/// Resolves the display (image) URL of a node.
pub fn resolve_display_url(node: &Value) -> Option<String> {
    if let Some(url) = first_str(node, &["display_url", "displayUrl"]) {
        return Some(url.to_string());
    }
    best_url(node.get("display_resources"))
        .or_else(|| best_url(node.get("image_versions2").and_then(|v| v.get("candidates"))))
        .or_else(|| best_url(node.get("candidates")))
        .or_else(|| first_str(node, &["thumbnail_src", "thumbnail_url"]).map(str::to_string))
}

/// Resolves the video URL of a node. There is no thumbnail fallback.
pub fn resolve_video_url(node: &Value) -> Option<String> {
    if let Some(url) = first_str(node, &["video_url", "videoUrl"]) {
        return Some(url.to_string());
    }
    best_url(node.get("video_versions")).or_else(|| best_url(node.get("video_resources")))
}

/// Normalizes one media node; `None` when no display URL resolves.
pub fn normalize_node(node: &Value) -> Option<NormalizedMediaItem> {
    let display_url = resolve_display_url(node)?;
    Some(NormalizedMediaItem {
        display_url,
        video_url: resolve_video_url(node),
        media_type: resolve_media_type(node),
    })
}

fn child_nodes(node: &Value) -> Vec<&Value> {
    let edges: Vec<&Value> = node
        .get("edge_sidecar_to_children")
        .and_then(|c| c.get("edges"))
        .and_then(Value::as_array)
        .map(|edges| edges.iter().filter_map(|e| e.get("node")).collect())
        .unwrap_or_default();
    if !edges.is_empty() {
        return edges;
    }
    if let Some(items) = node.get("carousel_media").and_then(Value::as_array) {
        if !items.is_empty() {
            return items.iter().collect();
        }
    }
    match node.get("children") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(children) => children
            .get("data")
            .and_then(Value::as_array)
            .map(|items| items.iter().collect())
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Collects the media items of a post in source order.
///
/// Carousel children are preferred; an empty child list falls through to the
/// next source, and a node without children stands for itself. Children that
/// do not resolve are dropped individually.
pub fn collect_media(node: &Value) -> Vec<NormalizedMediaItem> {
    let children = child_nodes(node);
    if children.is_empty() {
        return normalize_node(node).into_iter().collect();
    }
    let items: Vec<NormalizedMediaItem> = children.into_iter().filter_map(normalize_node).collect();
    tracing::trace!(count = items.len(), "collected carousel children");
    items
}
