// ABOUTME: Post link recognition and canonicalization for the site's historical path forms.
// ABOUTME: Also scans free text for post links and returns them deduplicated in order.

//! Post link canonicalization.
//!
//! Recognized forms (host `instagram.com` or `instagr.am`, any `www.` prefix):
//! - `/p/<id>/`, `/reel/<id>/`, `/reels/<id>/`
//! - `/share/<type>/<id>/` (unwrapped one level)
//! - `/<user>/<type>/<id>/`
//!
//! Everything else (profiles, stories, `/tv/` long-form, explore pages) is
//! rejected.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::ExtractError;
use crate::result::{CanonicalPostUrl, PostKind};

/// Host used in canonical links.
pub const CANONICAL_HOST: &str = "www.instagram.com";

const ACCEPTED_HOSTS: &[&str] = &["instagram.com", "instagr.am"];

/// Generic link pattern: anything URL-like mentioning an accepted host.
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:https?://)?\b(?:[a-z0-9-]+\.)*(?:instagram\.com|instagr\.am)/[^\s<>"'`]*"#)
        .unwrap()
});

const TRAILING_PUNCTUATION: &[char] = &[')', ']', '}', '>', '"', '\'', '.', ',', ';', ':', '!', '?'];

/// Builds the canonical URL for a kind and short id.
pub fn canonical_url_for(kind: PostKind, short_id: &str) -> String {
    format!("https://{}/{}/{}/", CANONICAL_HOST, kind.segment(), short_id)
}

fn is_short_id(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn host_accepted(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    ACCEPTED_HOSTS.contains(&host)
}

/// Recognizes a post link and rewrites it to canonical form.
///
/// Input may omit the scheme. Fails with `NotRecognized` for foreign hosts,
/// paths with fewer than two segments, unknown types, or a malformed id.
pub fn canonicalize(input: &str) -> Result<CanonicalPostUrl, ExtractError> {
    let reject = |reason: &str| {
        ExtractError::not_recognized(
            input,
            "links::canonicalize",
            Some(anyhow::anyhow!("{}", reason)),
        )
    };

    let trimmed = input.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };
    let url = Url::parse(&with_scheme).map_err(|_| reject("malformed URL"))?;

    let host = url.host_str().ok_or_else(|| reject("missing host"))?;
    if !host_accepted(host) {
        return Err(reject("foreign host"));
    }

    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    if segments.len() < 2 {
        return Err(reject("too few path segments"));
    }

    if segments[0].eq_ignore_ascii_case("share") {
        if segments.len() < 3 {
            return Err(reject("share link without type and id"));
        }
        segments.remove(0);
    }

    let (kind, short_id) = match PostKind::from_segment(segments[0]) {
        Some(kind) => (kind, segments[1]),
        None => match segments.get(1).and_then(|s| PostKind::from_segment(s)) {
            Some(kind) if segments.len() >= 3 => (kind, segments[2]),
            _ => return Err(reject("unrecognized path type")),
        },
    };

    if !is_short_id(short_id) {
        return Err(reject("malformed short id"));
    }

    Ok(CanonicalPostUrl {
        short_id: short_id.to_string(),
        kind,
        canonical_url: canonical_url_for(kind, short_id),
    })
}

/// Finds every post link in free text.
///
/// Trailing punctuation is stripped before canonicalizing; results are
/// deduplicated by canonical URL and keep first-seen order.
pub fn extract_post_links(text: &str) -> Vec<CanonicalPostUrl> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for m in LINK_RE.find_iter(text) {
        let candidate = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if let Ok(link) = canonicalize(candidate) {
            if seen.insert(link.canonical_url.clone()) {
                out.push(link);
            }
        }
    }
    out
}
