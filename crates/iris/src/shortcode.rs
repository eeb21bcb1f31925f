// ABOUTME: Bijective codec between post short identifiers and numeric media ids.
// ABOUTME: Uses a fixed 64-symbol alphabet and arbitrary-precision integers.

//! Short identifier codec.
//!
//! A short id is a base-64 numeral over [`ALPHABET`], most significant digit
//! first. Decoding is exact for identifiers of any length; any symbol outside
//! the alphabet fails the whole decode rather than producing a wrong id.

use num_bigint::BigUint;

use crate::error::ExtractError;

/// Digit alphabet, index = digit value.
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn digit_value(ch: char) -> Option<u32> {
    let v = match ch {
        'A'..='Z' => ch as u32 - 'A' as u32,
        'a'..='z' => ch as u32 - 'a' as u32 + 26,
        '0'..='9' => ch as u32 - '0' as u32 + 52,
        '-' => 62,
        '_' => 63,
        _ => return None,
    };
    Some(v)
}

/// Decodes a short id into its numeric media id.
///
/// Fails with `MalformedReference` on an empty id or any symbol outside the
/// alphabet.
pub fn decode(short_id: &str) -> Result<BigUint, ExtractError> {
    if short_id.is_empty() {
        return Err(ExtractError::malformed_reference(
            short_id,
            "shortcode::decode",
            Some(anyhow::anyhow!("empty identifier")),
        ));
    }

    let mut id = BigUint::from(0u32);
    for (pos, ch) in short_id.chars().enumerate() {
        let digit = digit_value(ch).ok_or_else(|| {
            ExtractError::malformed_reference(
                short_id,
                "shortcode::decode",
                Some(anyhow::anyhow!("invalid symbol {:?} at position {}", ch, pos)),
            )
        })?;
        id = id * 64u32 + digit;
    }
    Ok(id)
}

/// Decodes a short id and formats the media id in decimal.
pub fn decode_to_string(short_id: &str) -> Result<String, ExtractError> {
    decode(short_id).map(|id| id.to_string())
}

/// Encodes a numeric media id as a short id. Zero encodes to `"A"`.
pub fn encode(id: &BigUint) -> String {
    let alphabet = ALPHABET.as_bytes();
    id.to_radix_be(64)
        .into_iter()
        .map(|digit| alphabet[digit as usize] as char)
        .collect()
}

/// Encodes a decimal media id string as a short id.
///
/// Accepts the `<media>_<owner>` composite form used by some API families,
/// in which case only the media part is encoded.
pub fn media_id_to_shortcode(media_id: &str) -> Option<String> {
    let numeric = media_id.split('_').next()?.trim();
    if numeric.is_empty() || !numeric.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id: BigUint = numeric.parse().ok()?;
    Some(encode(&id))
}
