// ABOUTME: Data model for the known payload shapes: root paths, root keys, markers and script ids.
// ABOUTME: Tables are plain serde data so new shapes can be appended without touching control flow.

//! Payload shape tables.
//!
//! The site has moved its post data around many times. Each place a root
//! media node has been observed is recorded here as data and tried in order
//! by the extractor.

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::navigate::PathStep;

/// Known locations of post data in page payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PayloadShapes {
    /// JSON paths to the root media node, tried in order.
    #[serde(default)]
    pub root_paths: Vec<Vec<PathStep>>,
    /// Keys that name a root media node anywhere in the document.
    #[serde(default)]
    pub root_keys: Vec<String>,
    /// Path used when the document is a flat item list.
    #[serde(default)]
    pub items_path: Vec<PathStep>,
    /// Literal prefixes that precede inline state objects in markup.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Ids of script tags holding a JSON document.
    #[serde(default)]
    pub script_ids: Vec<String>,
}

impl PayloadShapes {
    /// Parses shape tables from JSON. Missing tables default to empty.
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        serde_json::from_str(json).map_err(|e| {
            ExtractError::parse_failure("", "PayloadShapes::from_json", Some(e.into()))
        })
    }

    pub fn push_root_path(&mut self, path: Vec<PathStep>) {
        self.root_paths.push(path);
    }

    pub fn push_root_key(&mut self, key: impl Into<String>) {
        self.root_keys.push(key.into());
    }

    pub fn push_marker(&mut self, marker: impl Into<String>) {
        self.markers.push(marker.into());
    }

    pub fn push_script_id(&mut self, id: impl Into<String>) {
        self.script_ids.push(id.into());
    }

    /// Appends every table of `other` after this one's entries.
    ///
    /// `other.items_path` replaces this one only when non-empty.
    pub fn extend(&mut self, other: PayloadShapes) {
        self.root_paths.extend(other.root_paths);
        self.root_keys.extend(other.root_keys);
        self.markers.extend(other.markers);
        self.script_ids.extend(other.script_ids);
        if !other.items_path.is_empty() {
            self.items_path = other.items_path;
        }
    }

    /// Returns true if no table has entries.
    pub fn is_empty(&self) -> bool {
        self.root_paths.is_empty()
            && self.root_keys.is_empty()
            && self.items_path.is_empty()
            && self.markers.is_empty()
            && self.script_ids.is_empty()
    }
}
