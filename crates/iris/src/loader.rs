// ABOUTME: Loader for the built-in payload shape tables embedded as JSON.
// ABOUTME: Provides load_builtin_shapes() used by the default Options.

use crate::shapes::PayloadShapes;

/// Embedded JSON describing every payload shape known at build time.
const BUILTIN_SHAPES_JSON: &str = include_str!("../data/payload_shapes.json");

/// Loads the built-in payload shapes.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed.
pub fn load_builtin_shapes() -> PayloadShapes {
    serde_json::from_str(BUILTIN_SHAPES_JSON).expect("failed to parse builtin payload shapes")
}
