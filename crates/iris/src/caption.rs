// ABOUTME: Caption and author resolution from structured data and free-text meta values.
// ABOUTME: Also strips the site's "N likes, M comments - user:" wrapper from captions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::entities::decode_entities;
use crate::navigate::{find_value_by_key, first_str};

/// Structured-data types that may carry a post caption.
const CAPTION_TYPES: &[&str] = &[
    "ImageObject",
    "VideoObject",
    "MediaObject",
    "SocialMediaPosting",
    "DiscussionForumPosting",
    "Article",
    "NewsArticle",
    "BlogPosting",
    "CreativeWork",
];

const CAPTION_FIELDS: &[&str] = &["caption", "articleBody", "description"];

static HANDLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").unwrap());

// the handle must be a whole token, so over-long tokens never match
static BYLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^A-Za-z0-9._])([A-Za-z0-9._]{1,30})\s+on\s+instagram\b").unwrap()
});

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([A-Za-z0-9._]{1,30})").unwrap());

static PREAMBLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*\d[\d,.]*\s*[km]?\s+likes?,\s*\d[\d,.]*\s*[km]?\s+comments?\s*-\s*[^:]+?:\s*(.*)$",
    )
    .unwrap()
});

static QUOTED_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)^[^"“]*["“](.*)["”]\s*\.?\s*$"#).unwrap());

static SITE_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bon\s+instagram\b").unwrap());

/// Every object reachable from `blocks` through arrays and object values,
/// parents before children, in document order.
pub fn flatten_objects(blocks: &[Value]) -> Vec<&Value> {
    let mut out = Vec::new();
    let mut stack: Vec<&Value> = blocks.iter().rev().collect();

    while let Some(value) = stack.pop() {
        match value {
            Value::Object(map) => {
                out.push(value);
                stack.extend(map.values().rev());
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }
    out
}

fn type_allowed(object: &Value) -> bool {
    match object.get("@type") {
        None => true,
        Some(Value::String(t)) => CAPTION_TYPES.contains(&t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| CAPTION_TYPES.contains(&t)),
        Some(_) => false,
    }
}

/// Finds a caption in structured data.
///
/// Whitelisted objects are tried first, fields in priority order; then a
/// bounded key search over every block. The result is entity-decoded and
/// cleaned.
pub fn caption_from_structured_data(blocks: &[Value], max_depth: usize) -> Option<String> {
    let typed = flatten_objects(blocks)
        .into_iter()
        .filter(|o| type_allowed(o))
        .find_map(|o| first_str(o, CAPTION_FIELDS));

    let raw = typed.or_else(|| {
        blocks.iter().find_map(|block| {
            CAPTION_FIELDS.iter().find_map(|field| {
                find_value_by_key(block, &[*field], max_depth)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
        })
    })?;

    let cleaned = clean_caption(raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn author_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let name = s.trim().trim_start_matches('@').trim();
            if name.is_empty() {
                None
            } else {
                Some(decode_entities(name))
            }
        }
        Value::Object(_) => first_str(value, &["name", "alternateName"])
            .map(|n| n.trim_start_matches('@'))
            .filter(|n| !n.is_empty())
            .map(decode_entities),
        _ => None,
    }
}

/// Finds the author name in structured data.
pub fn author_from_structured_data(blocks: &[Value]) -> Option<String> {
    flatten_objects(blocks).into_iter().find_map(|object| {
        match object.get("author")? {
            Value::Array(entries) => entries.iter().find_map(author_name),
            other => author_name(other),
        }
    })
}

/// Returns true if `s` is a bare account handle.
pub fn is_handle(s: &str) -> bool {
    HANDLE_RE.is_match(s)
}

/// Pulls a handle out of free text such as an `og:title` value.
pub fn handle_from_text(text: &str) -> Option<String> {
    let text = decode_entities(text);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if HANDLE_RE.is_match(text) {
        return Some(text.to_string());
    }
    if let Some(caps) = BYLINE_RE.captures(text) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = MENTION_RE.captures(text) {
        return Some(caps[1].to_string());
    }

    text.split_whitespace().find_map(|token| {
        let stripped: String = token
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
            .collect();
        HANDLE_RE.is_match(&stripped).then_some(stripped)
    })
}

fn quoted_tail(text: &str) -> Option<String> {
    QUOTED_TAIL_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Decodes entities and removes the likes/comments wrapper.
pub fn clean_caption(text: &str) -> String {
    let decoded = decode_entities(text);
    let mut caption = decoded.trim().to_string();

    if let Some(caps) = PREAMBLE_RE.captures(&caption) {
        let rest = caps[1].trim().to_string();
        caption = quoted_tail(&rest).unwrap_or(rest);
    }

    if SITE_MARKER_RE.is_match(&caption) {
        if let Some(quoted) = quoted_tail(&caption) {
            caption = quoted;
        }
    }
    caption
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn caption_from_image_object_is_decoded() {
        let blocks = vec![json!({"@type": "ImageObject", "caption": "Tom &amp; Jerry"})];
        assert_eq!(
            caption_from_structured_data(&blocks, 6).as_deref(),
            Some("Tom & Jerry")
        );
    }

    #[test]
    fn caption_field_priority_and_type_whitelist() {
        let blocks = vec![
            json!({"@type": "Person", "description": "bio text"}),
            json!({"@type": ["SocialMediaPosting"], "description": "desc", "articleBody": "body"}),
        ];
        assert_eq!(caption_from_structured_data(&blocks, 6).as_deref(), Some("body"));
    }

    #[test]
    fn caption_falls_back_to_key_search() {
        let blocks = vec![json!({"@type": "Person", "description": "only here"})];
        assert_eq!(
            caption_from_structured_data(&blocks, 6).as_deref(),
            Some("only here")
        );
        assert!(caption_from_structured_data(&[json!({"@type": "Person"})], 6).is_none());
    }

    #[test]
    fn key_search_fallback_skips_non_string_fields() {
        let blocks = vec![json!({
            "@type": "Person",
            "mainEntity": {
                "@type": "Person",
                "caption": {"text": "nested"},
                "description": "plain words"
            }
        })];
        assert_eq!(
            caption_from_structured_data(&blocks, 6).as_deref(),
            Some("plain words")
        );
    }

    #[test]
    fn flatten_visits_nested_objects_in_order() {
        let blocks = vec![json!({"@graph": [{"id": 1, "inner": {"id": 2}}, {"id": 3}]})];
        let ids: Vec<i64> = flatten_objects(&blocks)
            .iter()
            .filter_map(|o| o.get("id").and_then(Value::as_i64))
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn author_forms() {
        let string = vec![json!({"author": "  @someone "})];
        assert_eq!(author_from_structured_data(&string).as_deref(), Some("someone"));

        let array = vec![json!({"author": [{"url": "x"}, {"alternateName": "@alt"}]})];
        assert_eq!(author_from_structured_data(&array).as_deref(), Some("alt"));

        let object = vec![json!({"author": {"name": "Real Name", "alternateName": "handle"}})];
        assert_eq!(author_from_structured_data(&object).as_deref(), Some("Real Name"));

        assert!(author_from_structured_data(&[json!({"name": "no author"})]).is_none());
    }

    #[test]
    fn handle_pattern_limits() {
        assert!(is_handle("a.b_c9"));
        assert!(!is_handle("Real Name"));
        assert!(!is_handle(&"x".repeat(31)));
    }

    #[test]
    fn handle_from_whole_text_byline_mention_and_tokens() {
        assert_eq!(handle_from_text("some.user_1").as_deref(), Some("some.user_1"));
        assert_eq!(
            handle_from_text("cats.daily on Instagram: \"hello\"").as_deref(),
            Some("cats.daily")
        );
        assert_eq!(
            handle_from_text("Photo by Someone (@real_handle) today").as_deref(),
            Some("real_handle")
        );
        assert_eq!(handle_from_text("(someone)").as_deref(), Some("someone"));
        assert!(handle_from_text("   ").is_none());
    }

    #[test]
    fn byline_requires_a_whole_token() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_ne!(
            handle_from_text(&format!("{long} on Instagram")).as_deref(),
            Some("ghijklmnopqrstuvwxyz0123456789")
        );
        assert_eq!(
            handle_from_text(&format!("{long} on Instagram: hi @real.one")).as_deref(),
            Some("real.one")
        );
        assert_eq!(
            handle_from_text("@cats.daily on Instagram").as_deref(),
            Some("cats.daily")
        );
    }

    #[test]
    fn clean_caption_strips_preamble_and_prefers_quotes() {
        assert_eq!(
            clean_caption("1,234 likes, 56 comments - username: \"Actual caption\""),
            "Actual caption"
        );
        assert_eq!(
            clean_caption("12K likes, 1.2k comments - someone on June 1, 2023: plain rest"),
            "plain rest"
        );
    }

    #[test]
    fn clean_caption_site_marker_prefers_quoted_tail() {
        assert_eq!(
            clean_caption("Someone on Instagram: &quot;Sunset &amp; sea&quot;"),
            "Sunset & sea"
        );
        assert_eq!(
            clean_caption("someone on instagram: “curly quotes”"),
            "curly quotes"
        );
    }

    #[test]
    fn clean_caption_leaves_plain_text() {
        assert_eq!(clean_caption("  just a caption  "), "just a caption");
        assert_eq!(clean_caption("He said \"hi\" to me"), "He said \"hi\" to me");
    }
}
