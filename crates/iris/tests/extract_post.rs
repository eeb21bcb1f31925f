// ABOUTME: End-to-end extraction tests over the payload shapes the site has shipped.
// ABOUTME: Covers inline state markers, framework script tags, API item lists and metadata-only pages.

use digests_iris::{
    canonicalize, extract_post, extract_post_links, Extractor, MediaType, Payload, PayloadShapes,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn page(head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head>{}</head><body>{}</body></html>",
        head, body
    )
}

#[test]
fn shared_data_marker_page() {
    let state = json!({
        "entry_data": {"PostPage": [{"graphql": {"shortcode_media": {
            "__typename": "GraphImage",
            "shortcode": "CuXHbO2sR-D",
            "display_resources": [
                {"src": "https://cdn.example/640.jpg", "config_width": 640, "config_height": 640},
                {"src": "https://cdn.example/1080.jpg", "config_width": 1080, "config_height": 1080}
            ],
            "edge_media_to_caption": {"edges": [{"node": {"text": "Braces } inside { text"}}]},
            "owner": {"username": "someone"},
            "taken_at_timestamp": 1688000000
        }}}]}
    });
    let html = page(
        "",
        &format!("<script>window._sharedData = {};</script>", state),
    );

    let post = extract_post(&Payload::from_text(html)).unwrap();
    assert_eq!(post.short_id, "CuXHbO2sR-D");
    assert_eq!(post.display_url, "https://cdn.example/1080.jpg");
    assert_eq!(post.caption, "Braces } inside { text");
    assert_eq!(post.author_handle, "someone");
    assert_eq!(
        post.canonical_url().as_deref(),
        Some("https://www.instagram.com/p/CuXHbO2sR-D/")
    );
}

#[test]
fn additional_data_loaded_marker_page() {
    let html = page(
        "",
        r#"<script>window.__additionalDataLoaded('/p/Cadd/',{"graphql":{"shortcode_media":{"shortcode":"Cadd","display_url":"https://cdn.example/add.jpg","is_video":true,"video_url":"https://cdn.example/add.mp4"}}});</script>"#,
    );
    let post = extract_post(&Payload::from_text(html)).unwrap();
    assert_eq!(post.short_id, "Cadd");
    assert_eq!(post.media_type, MediaType::Video);
    assert_eq!(post.video_url.as_deref(), Some("https://cdn.example/add.mp4"));
}

#[test]
fn next_data_script_page_with_meta_fallbacks() {
    let next = json!({"props": {"pageProps": {"post": {
        "display_url": "https://cdn.example/next.jpg"
    }}}});
    let html = page(
        r#"<meta property="og:url" content="https://www.instagram.com/p/CnextId/">
           <meta property="og:description" content="1,234 likes, 56 comments - nextuser on July 1, 2023: &quot;From the page&quot;">
           <meta property="og:title" content="nextuser on Instagram: &quot;From the page&quot;">"#,
        &format!(
            r#"<script id="__NEXT_DATA__" type="application/json">{}</script>"#,
            next
        ),
    );

    let post = extract_post(&Payload::from_text(html)).unwrap();
    assert_eq!(post.short_id, "CnextId");
    assert_eq!(post.display_url, "https://cdn.example/next.jpg");
    assert_eq!(post.caption, "From the page");
    assert_eq!(post.author_handle, "nextuser");
}

#[test]
fn metadata_only_page() {
    let html = page(
        r#"<link rel="canonical" href="https://www.instagram.com/reel/Cmeta/">
           <meta property="og:image" content="https://cdn.example/cover.jpg">
           <meta property="og:video" content="https://cdn.example/clip.mp4">
           <script type="application/ld+json">{"@type":"VideoObject","caption":"Tom &amp; Jerry","author":{"alternateName":"@cartoons"},"uploadDate":"2023-07-01T12:00:00+00:00"}</script>"#,
        "",
    );

    let post = extract_post(&Payload::from_text(html)).unwrap();
    assert_eq!(post.short_id, "Cmeta");
    assert_eq!(post.display_url, "https://cdn.example/cover.jpg");
    assert_eq!(post.video_url.as_deref(), Some("https://cdn.example/clip.mp4"));
    assert_eq!(post.media_type, MediaType::Video);
    assert_eq!(post.caption, "Tom & Jerry");
    assert_eq!(post.author_handle, "cartoons");
    assert_eq!(post.media.len(), 1);
    assert_eq!(
        post.timestamp.map(|t| t.to_rfc3339()).as_deref(),
        Some("2023-07-01T12:00:00+00:00")
    );
}

#[test]
fn page_without_any_post_is_not_found() {
    let html = page(r#"<meta property="og:title" content="Login">"#, "<p>Log in</p>");
    let err = extract_post(&Payload::from_text(html)).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn items_fallback_uses_first_item() {
    let payload = Payload::Json(json!({"items": [
        {"id": "first", "image_versions2": {"candidates": [{"url": "https://cdn.example/first.jpg"}]}},
        {"id": "second", "image_versions2": {"candidates": [{"url": "https://cdn.example/second.jpg"}]}}
    ]}));
    let post = extract_post(&payload).unwrap();
    assert_eq!(post.display_url, "https://cdn.example/first.jpg");
    assert_eq!(post.short_id, "");
}

#[test]
fn sidecar_partial_success_keeps_resolvable_items_in_order() {
    let children: Vec<_> = (0..10)
        .map(|i| {
            if i == 3 || i == 7 {
                json!({"node": {"__typename": "GraphImage"}})
            } else {
                json!({"node": {"display_url": format!("https://cdn.example/{}.jpg", i)}})
            }
        })
        .collect();
    let payload = Payload::Json(json!({"graphql": {"shortcode_media": {
        "__typename": "GraphSidecar",
        "shortcode": "Cside",
        "edge_sidecar_to_children": {"edges": children}
    }}}));

    let post = extract_post(&payload).unwrap();
    assert_eq!(post.media.len(), 8);
    assert_eq!(post.media_type, MediaType::Sidecar);
    let urls: Vec<&str> = post.media.iter().map(|m| m.display_url.as_str()).collect();
    assert_eq!(urls[0], "https://cdn.example/0.jpg");
    assert_eq!(urls[3], "https://cdn.example/4.jpg");
    assert_eq!(urls[7], "https://cdn.example/9.jpg");
}

#[test]
fn custom_shapes_extend_builtin_tables() {
    let extra = PayloadShapes::from_json(
        r#"{"markers": ["window.__postState = "], "root_paths": [["state", "post"]]}"#,
    )
    .unwrap();
    let mut shapes = digests_iris::load_builtin_shapes();
    shapes.extend(extra);
    let extractor = Extractor::builder().shapes(shapes).build();

    let html = page(
        "",
        r#"<script>window.__postState = {"state":{"post":{"code":"Cnew","display_url":"https://cdn.example/new.jpg"}}};</script>"#,
    );
    let post = extractor.extract_str(&html, None).unwrap();
    assert_eq!(post.short_id, "Cnew");
}

#[test]
fn links_in_captions_round_trip_through_canonicalize() {
    let text = "reposting instagram.com/reels/Cabc_1?igsh=x and https://www.instagram.com/p/Cdef/.";
    for link in extract_post_links(text) {
        assert_eq!(canonicalize(&link.canonical_url).unwrap(), link);
    }
    assert_eq!(extract_post_links(text).len(), 2);
}
