// ABOUTME: Main library entry point for the Iris post extractor.
// ABOUTME: Re-exports the public API: Extractor, Payload, CanonicalPost, ExtractError, link and id helpers.

//! Iris - normalizes photo/video post payloads into canonical post records.
//!
//! A payload is either raw page markup or an already-parsed JSON document.
//! The extractor tries every known payload shape in order and produces a
//! [`CanonicalPost`] with resolved media URLs, caption, author and time.
//!
//! # Example
//!
//! ```
//! use digests_iris::{extract_post, Payload};
//!
//! let payload = Payload::from_text(
//!     r#"{"graphql":{"shortcode_media":{"shortcode":"B","display_url":"https://cdn.example/a.jpg"}}}"#,
//! );
//! let post = extract_post(&payload).unwrap();
//! assert_eq!(post.short_id, "B");
//! ```

pub mod caption;
pub mod entities;
pub mod error;
pub mod extractor;
pub mod links;
pub mod loader;
pub mod markup;
pub mod media;
pub mod navigate;
pub mod options;
pub mod payload;
pub mod result;
pub mod shapes;
pub mod shortcode;
pub mod sources;

pub use crate::entities::decode_entities;
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractor::{extract_post, Extractor};
pub use crate::links::{canonicalize, extract_post_links};
pub use crate::loader::load_builtin_shapes;
pub use crate::navigate::{find_value_by_key, value_at_path, PathStep, DEFAULT_MAX_DEPTH};
pub use crate::options::{ExtractorBuilder, Options};
pub use crate::payload::Payload;
pub use crate::result::{
    CanonicalPost, CanonicalPostUrl, MediaCandidate, MediaType, NormalizedMediaItem, PostKind,
};
pub use crate::shapes::PayloadShapes;
