// ABOUTME: Value extractors over raw page markup: meta tags, ld+json blocks, inline state, script ids.
// ABOUTME: Every extractor is total and returns None instead of failing.

use scraper::{Html, Selector};
use serde_json::Value;

/// A markup payload parsed once and queried by several strategies.
pub struct Markup<'a> {
    raw: &'a str,
    doc: Html,
}

impl<'a> Markup<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            doc: Html::parse_document(raw),
        }
    }

    /// The unparsed markup text.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Returns the trimmed `content` of the first `<meta>` whose `property`
    /// or `name` equals `key`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        let selector = Selector::parse("meta").ok()?;
        self.doc
            .select(&selector)
            .find(|el| {
                let attrs = el.value();
                attrs.attr("property") == Some(key) || attrs.attr("name") == Some(key)
            })
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Parses every `application/ld+json` block, flattening top-level arrays.
    ///
    /// Blocks that are not valid JSON are skipped.
    pub fn structured_data(&self) -> Vec<Value> {
        let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
            return Vec::new();
        };

        let mut blocks = Vec::new();
        for (index, script) in self.doc.select(&selector).enumerate() {
            let text = script.text().collect::<String>();
            match serde_json::from_str::<Value>(text.trim()) {
                Ok(Value::Array(items)) => blocks.extend(items),
                Ok(value) => blocks.push(value),
                Err(err) => {
                    tracing::debug!(block = index, error = %err, "skipping invalid ld+json block");
                }
            }
        }
        blocks
    }

    /// Parses the object literal following the first occurrence of `marker`.
    pub fn marker_json(&self, marker: &str) -> Option<Value> {
        extract_marker_json(self.raw, marker)
    }

    /// Parses the body of the first `<script>` whose id is `id`.
    pub fn script_json(&self, id: &str) -> Option<Value> {
        let selector = Selector::parse("script[id]").ok()?;
        let script = self
            .doc
            .select(&selector)
            .find(|el| el.value().attr("id") == Some(id))?;
        let text = script.text().collect::<String>();
        match serde_json::from_str(text.trim()) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(id, error = %err, "script body is not JSON");
                None
            }
        }
    }

    /// Returns the `href` of `<link rel="canonical">`.
    pub fn canonical_link(&self) -> Option<String> {
        let selector = Selector::parse("link[rel='canonical']").ok()?;
        self.doc
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string)
    }
}

/// Locates `marker` in `raw` and parses the balanced `{...}` that follows it.
///
/// Braces inside string literals do not count; a backslash inside a string
/// escapes the next character. Returns `None` when the marker or an opening
/// brace is missing, the braces never balance, or the slice is not JSON.
pub fn extract_marker_json(raw: &str, marker: &str) -> Option<Value> {
    if marker.is_empty() {
        return None;
    }
    let after_marker = raw.find(marker)? + marker.len();
    let start = after_marker + raw[after_marker..].find('{')?;
    let end = balanced_object_end(&raw[start..])?;
    let slice = &raw[start..start + end];

    match serde_json::from_str(slice) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(marker, error = %err, "balanced object after marker is not JSON");
            None
        }
    }
}

/// Byte length of the balanced object at the start of `s` (which begins with `{`).
fn balanced_object_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
