// ABOUTME: Configuration options for the Iris extractor including Options and ExtractorBuilder.
// ABOUTME: ExtractorBuilder provides a fluent API for constructing Extractor instances.

use crate::extractor::Extractor;
use crate::loader::load_builtin_shapes;
use crate::navigate::{PathStep, DEFAULT_MAX_DEPTH};
use crate::shapes::PayloadShapes;

/// Configuration options for the extractor.
#[derive(Debug, Clone)]
pub struct Options {
    /// Nesting bound for key searches over payload documents.
    pub max_search_depth: usize,
    pub shapes: PayloadShapes,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_search_depth: DEFAULT_MAX_DEPTH,
            shapes: load_builtin_shapes(),
        }
    }
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ExtractorBuilder {
    opts: Options,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the key-search depth bound.
    pub fn max_search_depth(mut self, depth: usize) -> Self {
        self.opts.max_search_depth = depth;
        self
    }

    /// Replace the payload shape tables.
    pub fn shapes(mut self, shapes: PayloadShapes) -> Self {
        self.opts.shapes = shapes;
        self
    }

    /// Append a root path after the configured ones.
    pub fn root_path(mut self, path: Vec<PathStep>) -> Self {
        self.opts.shapes.push_root_path(path);
        self
    }

    /// Append a root key name.
    pub fn root_key(mut self, key: impl Into<String>) -> Self {
        self.opts.shapes.push_root_key(key);
        self
    }

    /// Append an inline-state marker.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.opts.shapes.push_marker(marker);
        self
    }

    /// Append a script id.
    pub fn script_id(mut self, id: impl Into<String>) -> Self {
        self.opts.shapes.push_script_id(id);
        self
    }

    /// Build the Extractor with the configured options.
    pub fn build(self) -> Extractor {
        Extractor::new(self.opts)
    }
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
