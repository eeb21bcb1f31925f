// ABOUTME: Strategy objects that carve JSON documents out of markup and locate the root media node.
// ABOUTME: Strategies live in ordered lists built from PayloadShapes and run with first-success semantics.

//! Extraction strategies.
//!
//! A [`PayloadSource`] turns parsed markup into a JSON document; a
//! [`RootLocator`] finds the root media node inside a document. Both lists
//! are built from [`PayloadShapes`] so appending a shape appends a strategy.

use serde_json::Value;

use crate::markup::Markup;
use crate::navigate::{find_value_by_key, value_at_path, PathStep};
use crate::shapes::PayloadShapes;

/// Produces a JSON document from markup.
pub trait PayloadSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> String;

    fn document(&self, markup: &Markup<'_>) -> Option<Value>;
}

/// Finds the root media node of a JSON document.
pub trait RootLocator: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> String;

    fn locate<'a>(&self, doc: &'a Value) -> Option<&'a Value>;
}

/// Inline state following a literal marker such as `window._sharedData = `.
#[derive(Debug, Clone)]
pub struct MarkerSource {
    pub marker: String,
}

impl PayloadSource for MarkerSource {
    fn name(&self) -> String {
        format!("marker {:?}", self.marker)
    }

    fn document(&self, markup: &Markup<'_>) -> Option<Value> {
        markup.marker_json(&self.marker)
    }
}

/// JSON body of a script tag addressed by id.
#[derive(Debug, Clone)]
pub struct ScriptIdSource {
    pub id: String,
}

impl PayloadSource for ScriptIdSource {
    fn name(&self) -> String {
        format!("script #{}", self.id)
    }

    fn document(&self, markup: &Markup<'_>) -> Option<Value> {
        markup.script_json(&self.id)
    }
}

/// A fixed JSON path.
#[derive(Debug, Clone)]
pub struct PathLocator {
    pub path: Vec<PathStep>,
}

impl RootLocator for PathLocator {
    fn name(&self) -> String {
        let steps: Vec<String> = self
            .path
            .iter()
            .map(|step| match step {
                PathStep::Key(k) => k.clone(),
                PathStep::Index(i) => format!("[{}]", i),
            })
            .collect();
        format!("path {}", steps.join("."))
    }

    fn locate<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        if self.path.is_empty() {
            return None;
        }
        value_at_path(doc, &self.path).filter(|v| v.is_object())
    }
}

/// Bounded search for any of a set of root key names.
#[derive(Debug, Clone)]
pub struct KeySearchLocator {
    pub keys: Vec<String>,
    pub max_depth: usize,
}

impl RootLocator for KeySearchLocator {
    fn name(&self) -> String {
        format!("key search {:?}", self.keys)
    }

    fn locate<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        if self.keys.is_empty() {
            return None;
        }
        let keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        find_value_by_key(doc, &keys, self.max_depth).filter(|v| v.is_object())
    }
}

/// Markup sources in order: markers first, then script ids.
pub fn payload_sources(shapes: &PayloadShapes) -> Vec<Box<dyn PayloadSource>> {
    let mut sources: Vec<Box<dyn PayloadSource>> = Vec::new();
    for marker in &shapes.markers {
        sources.push(Box::new(MarkerSource {
            marker: marker.clone(),
        }));
    }
    for id in &shapes.script_ids {
        sources.push(Box::new(ScriptIdSource { id: id.clone() }));
    }
    sources
}

/// Root locators in order: every root path, the key search, then the items path.
pub fn root_locators(shapes: &PayloadShapes, max_depth: usize) -> Vec<Box<dyn RootLocator>> {
    let mut locators: Vec<Box<dyn RootLocator>> = Vec::new();
    for path in &shapes.root_paths {
        locators.push(Box::new(PathLocator { path: path.clone() }));
    }
    if !shapes.root_keys.is_empty() {
        locators.push(Box::new(KeySearchLocator {
            keys: shapes.root_keys.clone(),
            max_depth,
        }));
    }
    if !shapes.items_path.is_empty() {
        locators.push(Box::new(PathLocator {
            path: shapes.items_path.clone(),
        }));
    }
    locators
}

/// Runs `locators` in order and returns the first root found.
pub fn locate_root<'a>(locators: &[Box<dyn RootLocator>], doc: &'a Value) -> Option<&'a Value> {
    locators.iter().find_map(|locator| {
        let found = locator.locate(doc);
        match found {
            Some(_) => tracing::debug!(locator = %locator.name(), "root media node located"),
            None => tracing::trace!(locator = %locator.name(), "no root media node"),
        }
        found
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_builtin_shapes;
    use crate::navigate::DEFAULT_MAX_DEPTH;
    use serde_json::json;

    fn builtin_locators() -> Vec<Box<dyn RootLocator>> {
        root_locators(&load_builtin_shapes(), DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn locator_order_follows_shapes() {
        let locators = builtin_locators();
        assert_eq!(locators.len(), 10);
        assert_eq!(
            locators[0].name(),
            "path entry_data.PostPage.[0].graphql.shortcode_media"
        );
        assert!(locators[8].name().starts_with("key search"));
        assert_eq!(locators[9].name(), "path items.[0]");
    }

    #[test]
    fn legacy_path_wins_over_key_search() {
        let doc = json!({
            "entry_data": {"PostPage": [{"graphql": {"shortcode_media": {"shortcode": "A1"}}}]},
            "other": {"shortcode_media": {"shortcode": "B2"}}
        });
        let root = locate_root(&builtin_locators(), &doc).unwrap();
        assert_eq!(root["shortcode"], "A1");
    }

    #[test]
    fn key_search_finds_nested_root() {
        let doc = json!({"require": [{"payload": {"xdt_shortcode_media": {"code": "K9"}}}]});
        let root = locate_root(&builtin_locators(), &doc).unwrap();
        assert_eq!(root["code"], "K9");
    }

    #[test]
    fn items_fallback_returns_first_item() {
        let doc = json!({"items": [{"id": "first"}, {"id": "second"}]});
        let root = locate_root(&builtin_locators(), &doc).unwrap();
        assert_eq!(root["id"], "first");
    }

    #[test]
    fn nothing_located_in_unrelated_document() {
        let doc = json!({"config": {"viewer": null}, "items": []});
        assert!(locate_root(&builtin_locators(), &doc).is_none());
    }

    #[test]
    fn sources_order_markers_then_scripts() {
        let sources = payload_sources(&load_builtin_shapes());
        let names: Vec<String> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "marker \"window._sharedData = \"",
                "marker \"window.__additionalDataLoaded(\"",
                "script #__NEXT_DATA__",
            ]
        );
    }

    #[test]
    fn script_source_reads_document() {
        let html = r#"<html><body><script id="__NEXT_DATA__">{"props":{"pageProps":{"post":{"code":"N1"}}}}</script></body></html>"#;
        let markup = Markup::parse(html);
        let doc = ScriptIdSource {
            id: "__NEXT_DATA__".to_string(),
        }
        .document(&markup)
        .unwrap();
        let root = locate_root(&builtin_locators(), &doc).unwrap();
        assert_eq!(root["code"], "N1");
    }
}
