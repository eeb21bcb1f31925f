// ABOUTME: Post assembler: locates the root media node in a payload and builds a CanonicalPost.
// ABOUTME: Falls back to page metadata when markup carries no embedded post document.

//! Post assembly.
//!
//! An [`Extractor`] owns its [`Options`] and the strategy lists derived from
//! them. Extraction of a markup payload runs every [`PayloadSource`] in
//! order; the first document in which a [`RootLocator`] finds a root media
//! node is assembled. JSON payloads go straight to root location.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::caption::{
    author_from_structured_data, caption_from_structured_data, clean_caption, flatten_objects,
    handle_from_text, is_handle,
};
use crate::error::ExtractError;
use crate::links::canonicalize;
use crate::markup::Markup;
use crate::media::{collect_media, resolve_display_url, resolve_media_type, resolve_video_url};
use crate::navigate::{first_str, str_at_path, PathStep};
use crate::options::{ExtractorBuilder, Options};
use crate::payload::Payload;
use crate::result::{CanonicalPost, MediaType, NormalizedMediaItem};
use crate::shortcode::media_id_to_shortcode;
use crate::sources::{locate_root, payload_sources, root_locators, PayloadSource, RootLocator};

/// Structured-data fields holding an upload time.
const DATE_FIELDS: &[&str] = &["uploadDate", "dateCreated", "datePublished"];

/// Page-level hints available when the payload is markup.
struct PageHints<'m, 'a> {
    markup: &'m Markup<'a>,
    blocks: Vec<Value>,
}

impl PageHints<'_, '_> {
    fn meta(&self, key: &str) -> Option<String> {
        self.markup.meta_content(key)
    }
}

/// Builds canonical post records from page payloads.
pub struct Extractor {
    opts: Options,
    sources: Vec<Box<dyn PayloadSource>>,
    locators: Vec<Box<dyn RootLocator>>,
}

impl Extractor {
    pub fn new(opts: Options) -> Self {
        let sources = payload_sources(&opts.shapes);
        let locators = root_locators(&opts.shapes, opts.max_search_depth);
        Self {
            opts,
            sources,
            locators,
        }
    }

    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Extracts a post from a payload.
    ///
    /// `context_url` is the page address, used to recover the short id when
    /// the payload omits it.
    pub fn extract(
        &self,
        payload: &Payload,
        context_url: Option<&str>,
    ) -> Result<CanonicalPost, ExtractError> {
        match payload {
            Payload::Json(doc) => {
                let root = locate_root(&self.locators, doc).ok_or_else(|| {
                    ExtractError::not_found(context_url.unwrap_or(""), "extract", None)
                })?;
                self.assemble(root, context_url, None)
            }
            Payload::Markup(raw) => self.extract_markup(raw, context_url),
        }
    }

    /// Classifies `text` as JSON or markup and extracts a post from it.
    pub fn extract_str(
        &self,
        text: &str,
        context_url: Option<&str>,
    ) -> Result<CanonicalPost, ExtractError> {
        self.extract(&Payload::from_text(text), context_url)
    }

    fn extract_markup(
        &self,
        raw: &str,
        context_url: Option<&str>,
    ) -> Result<CanonicalPost, ExtractError> {
        let markup = Markup::parse(raw);
        let hints = PageHints {
            markup: &markup,
            blocks: markup.structured_data(),
        };

        let mut unresolved = None;
        for source in &self.sources {
            let Some(doc) = source.document(&markup) else {
                tracing::trace!(source = %source.name(), "no document");
                continue;
            };
            let Some(root) = locate_root(&self.locators, &doc) else {
                tracing::debug!(source = %source.name(), "document without root media node");
                continue;
            };
            match self.assemble(root, context_url, Some(&hints)) {
                Ok(post) => return Ok(post),
                Err(err) if err.is_no_resolvable_media() => unresolved = Some(err),
                Err(err) => return Err(err),
            }
        }

        if let Some(post) = self.post_from_metadata(&hints, context_url) {
            tracing::debug!(short_id = %post.short_id, "post built from page metadata");
            return Ok(post);
        }
        Err(unresolved.unwrap_or_else(|| {
            ExtractError::not_found(context_url.unwrap_or(""), "extract", None)
        }))
    }

    fn assemble(
        &self,
        root: &Value,
        context_url: Option<&str>,
        hints: Option<&PageHints<'_, '_>>,
    ) -> Result<CanonicalPost, ExtractError> {
        let short_id = short_id_from_node(root)
            .or_else(|| short_id_from_page(context_url, hints))
            .or_else(|| short_id_from_numeric(root))
            .unwrap_or_default();

        let media = collect_media(root);
        let Some(first) = media.first() else {
            return Err(ExtractError::no_resolvable_media(
                short_id,
                "extract",
                Some(anyhow::anyhow!("root media node has no usable URL")),
            ));
        };

        let display_url = resolve_display_url(root).unwrap_or_else(|| first.display_url.clone());
        let video_url =
            resolve_video_url(root).or_else(|| media.iter().find_map(|m| m.video_url.clone()));

        let mut media_type = resolve_media_type(root);
        if media.len() > 1 {
            media_type = MediaType::Sidecar;
        }

        let caption = caption_from_node(root)
            .map(clean_caption)
            .filter(|c| !c.is_empty())
            .or_else(|| {
                hints.and_then(|h| caption_from_structured_data(&h.blocks, self.opts.max_search_depth))
            })
            .or_else(|| hints.and_then(|h| h.meta("og:description")).map(|d| clean_caption(&d)))
            .unwrap_or_default();

        let mut post = CanonicalPost {
            short_id,
            display_url,
            video_url,
            caption,
            timestamp: timestamp_from_node(root).or_else(|| hints.and_then(timestamp_from_page)),
            media_type,
            media,
            ..Default::default()
        };
        apply_owner(&mut post, root);
        if let Some(hints) = hints {
            apply_page_author(&mut post, hints);
        }
        Ok(post)
    }

    /// Builds a single-item post from `og:*` meta tags and structured data.
    fn post_from_metadata(
        &self,
        hints: &PageHints<'_, '_>,
        context_url: Option<&str>,
    ) -> Option<CanonicalPost> {
        let display_url = hints
            .meta("og:image")
            .or_else(|| ld_image(&hints.blocks))?;
        let video_url = hints
            .meta("og:video:secure_url")
            .or_else(|| hints.meta("og:video"))
            .or_else(|| ld_video(&hints.blocks));
        let media_type = if video_url.is_some() {
            MediaType::Video
        } else {
            MediaType::Image
        };

        let caption = caption_from_structured_data(&hints.blocks, self.opts.max_search_depth)
            .or_else(|| hints.meta("og:description").map(|d| clean_caption(&d)))
            .unwrap_or_default();

        let mut post = CanonicalPost {
            short_id: short_id_from_page(context_url, Some(hints)).unwrap_or_default(),
            display_url: display_url.clone(),
            video_url: video_url.clone(),
            caption,
            timestamp: timestamp_from_page(hints),
            media_type,
            media: vec![NormalizedMediaItem {
                display_url,
                video_url,
                media_type,
            }],
            ..Default::default()
        };
        apply_page_author(&mut post, hints);
        Some(post)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

/// Extracts a post with the default extractor.
pub fn extract_post(payload: &Payload) -> Result<CanonicalPost, ExtractError> {
    Extractor::default().extract(payload, None)
}

fn short_id_from_node(root: &Value) -> Option<String> {
    first_str(root, &["shortcode", "code"]).map(str::to_string)
}

fn short_id_from_page(
    context_url: Option<&str>,
    hints: Option<&PageHints<'_, '_>>,
) -> Option<String> {
    let from_link = |link: &str| canonicalize(link).ok().map(|c| c.short_id);

    context_url.and_then(from_link).or_else(|| {
        let hints = hints?;
        hints
            .meta("og:url")
            .and_then(|u| from_link(&u))
            .or_else(|| hints.markup.canonical_link().and_then(|u| from_link(&u)))
    })
}

fn short_id_from_numeric(root: &Value) -> Option<String> {
    ["pk", "id"].iter().find_map(|field| match root.get(*field)? {
        Value::String(s) => media_id_to_shortcode(s),
        Value::Number(n) => media_id_to_shortcode(&n.to_string()),
        _ => None,
    })
}

fn caption_from_node(root: &Value) -> Option<&str> {
    let edge_path = [
        PathStep::key("edge_media_to_caption"),
        PathStep::key("edges"),
        PathStep::Index(0),
        PathStep::key("node"),
        PathStep::key("text"),
    ];
    str_at_path(root, &edge_path)
        .or_else(|| str_at_path(root, &[PathStep::key("caption"), PathStep::key("text")]))
        .or_else(|| first_str(root, &["caption"]))
}

fn timestamp_from_node(root: &Value) -> Option<DateTime<Utc>> {
    ["taken_at_timestamp", "taken_at"].iter().find_map(|field| {
        let secs = root.get(*field)?.as_i64()?;
        DateTime::<Utc>::from_timestamp(secs, 0)
    })
}

fn timestamp_from_page(hints: &PageHints<'_, '_>) -> Option<DateTime<Utc>> {
    flatten_objects(&hints.blocks).into_iter().find_map(|o| {
        DATE_FIELDS.iter().find_map(|field| {
            let raw = o.get(*field)?.as_str()?;
            DateTime::parse_from_rfc3339(raw.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
    })
}

fn apply_owner(post: &mut CanonicalPost, root: &Value) {
    let Some(owner) = ["owner", "user"]
        .iter()
        .find_map(|k| root.get(*k).filter(|v| v.is_object()))
    else {
        return;
    };
    if let Some(handle) = first_str(owner, &["username"]) {
        post.author_handle = handle.to_string();
    }
    post.author_display_name = first_str(owner, &["full_name"]).map(str::to_string);
    post.author_avatar_url = first_str(owner, &["profile_pic_url"]).map(str::to_string);
}

fn apply_page_author(post: &mut CanonicalPost, hints: &PageHints<'_, '_>) {
    if post.has_author() {
        return;
    }
    if let Some(name) = author_from_structured_data(&hints.blocks) {
        if is_handle(&name) {
            post.author_handle = name;
            return;
        }
        if post.author_display_name.is_none() {
            post.author_display_name = Some(name);
        }
    }
    let handle = ["og:title", "og:description"]
        .iter()
        .filter_map(|key| hints.meta(key))
        .find_map(|text| handle_from_text(&text));
    if let Some(handle) = handle {
        post.author_handle = handle;
    }
}

/// A URL held by an ld+json image-like field: string, array or `{url}` object.
fn ld_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(ld_url),
        Value::Object(_) => first_str(value, &["url", "contentUrl"]).map(str::to_string),
        _ => None,
    }
}

fn ld_image(blocks: &[Value]) -> Option<String> {
    flatten_objects(blocks).into_iter().find_map(|o| {
        ["image", "thumbnailUrl", "contentUrl"]
            .iter()
            .find_map(|field| o.get(*field).and_then(ld_url))
    })
}

fn ld_video(blocks: &[Value]) -> Option<String> {
    flatten_objects(blocks)
        .into_iter()
        .filter(|o| o.get("@type").and_then(Value::as_str) == Some("VideoObject"))
        .find_map(|o| o.get("contentUrl").and_then(ld_url))
}
