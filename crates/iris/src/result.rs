// ABOUTME: Canonical record types produced by extraction: posts, media items and post links.
// ABOUTME: All records serialize to JSON so the CLI and downstream pipelines can consume them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media a post or item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Sidecar,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Sidecar => "sidecar",
        };
        write!(f, "{}", s)
    }
}

/// Path type of a recognized post link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Post,
    Reel,
}

impl PostKind {
    /// Path segment used in the canonical URL.
    pub fn segment(self) -> &'static str {
        match self {
            PostKind::Post => "p",
            PostKind::Reel => "reel",
        }
    }

    /// Maps a path segment to a kind; the legacy plural `reels` maps to `Reel`.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "p" => Some(PostKind::Post),
            "reel" | "reels" => Some(PostKind::Reel),
            _ => None,
        }
    }
}

/// A recognized post link rewritten to its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPostUrl {
    pub short_id: String,
    pub kind: PostKind,
    pub canonical_url: String,
}

/// A candidate image or video URL with optional pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCandidate {
    pub url: String,
    pub width: Option<u64>,
    pub height: Option<u64>,
}

impl MediaCandidate {
    /// Pixel area, or 0 when either dimension is missing or zero.
    pub fn area(&self) -> u64 {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => w.saturating_mul(h),
            _ => 0,
        }
    }
}

/// One resolved media item of a post. `display_url` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMediaItem {
    pub display_url: String,
    pub video_url: Option<String>,
    pub media_type: MediaType,
}

/// The canonical description of one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CanonicalPost {
    pub short_id: String,
    pub display_url: String,
    pub video_url: Option<String>,
    pub caption: String,
    pub author_handle: String,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub media_type: MediaType,
    pub media: Vec<NormalizedMediaItem>,
}

impl CanonicalPost {
    /// Canonical link for the post, when the short id is known.
    pub fn canonical_url(&self) -> Option<String> {
        if self.short_id.is_empty() {
            return None;
        }
        let kind = match self.media_type {
            MediaType::Video => PostKind::Reel,
            _ => PostKind::Post,
        };
        Some(crate::links::canonical_url_for(kind, &self.short_id))
    }

    /// Returns true if the post is a multi-item carousel.
    pub fn is_sidecar(&self) -> bool {
        self.media.len() > 1 || self.media_type == MediaType::Sidecar
    }

    /// Returns true if the post has an author handle.
    pub fn has_author(&self) -> bool {
        !self.author_handle.is_empty()
    }
}
