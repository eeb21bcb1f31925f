// ABOUTME: Payload intake: turns raw bytes or text into markup or an already-parsed JSON document.
// ABOUTME: Handles charset decoding via content-type hints or detection.

use serde_json::Value;

use crate::error::ExtractError;

/// A page payload handed to the extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw page markup.
    Markup(String),
    /// A parsed JSON document, such as an API response.
    Json(Value),
}

impl Payload {
    /// Parses `text` as a JSON document.
    pub fn json(text: &str) -> Result<Self, ExtractError> {
        serde_json::from_str(text)
            .map(Payload::Json)
            .map_err(|e| ExtractError::parse_failure("", "Payload::json", Some(e.into())))
    }

    /// Classifies text: a document that parses as a JSON object or array is
    /// `Json`, anything else is `Markup`.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim_start_matches('\u{feff}').trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return Payload::Json(value);
            }
        }
        Payload::Markup(text)
    }

    /// Decodes `bytes` and classifies the result.
    ///
    /// A JSON content type makes the payload strictly JSON, so a document
    /// that fails to parse is a `ParseFailure` instead of markup.
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Result<Self, ExtractError> {
        let text = decode_body(bytes, content_type);
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);
        if is_json {
            return Self::json(text.trim_start_matches('\u{feff}'));
        }
        Ok(Self::from_text(text))
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, Payload::Markup(_))
    }
}

/// Decodes payload bytes.
///
/// A charset named in `content_type` wins when `encoding_rs` knows the label;
/// otherwise `chardetng` guesses from the bytes themselves.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(extract_charset)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()));
    let encoding = declared.unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(body, true);
        detector.guess(None, true)
    });
    encoding.decode(body).0.into_owned()
}

/// Pulls the `charset=` parameter out of a content-type value, unquoted.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .find_map(|part| part.trim().strip_prefix("charset=").map(str::to_string))
        .map(|cs| cs.trim_matches(|c| c == '"' || c == '\'').to_string())
}
