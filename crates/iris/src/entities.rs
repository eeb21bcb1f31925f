// ABOUTME: HTML character reference decoding for captions, handles and meta values.
// ABOUTME: Resolves numeric references first, then a small named table in a single pass.

/// Named references resolved after numeric ones.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", "\u{00A0}"),
];

/// Decodes HTML character references in `s`.
///
/// Hexadecimal (`&#x1F600;`) and decimal (`&#38;`) references are resolved by
/// code point first; references with non-numeric content, a missing `;`, or a
/// value that is not a Unicode scalar are left verbatim. Named references are
/// applied afterwards in one left-to-right pass, so `&amp;lt;` becomes `&lt;`
/// and not `<`.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    decode_named(&decode_numeric(s))
}

fn decode_numeric(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("&#") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match parse_numeric_reference(candidate) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                out.push_str("&#");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parses `&#...;` at the start of `s`, returning the decoded char and the
/// number of bytes consumed.
fn parse_numeric_reference(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix("&#")?;
    let (digits_start, radix) = match body.as_bytes().first() {
        Some(b'x') | Some(b'X') => (1, 16),
        _ => (0, 10),
    };
    let digits = &body[digits_start..];
    let end = digits.find(';')?;
    let number = &digits[..end];
    if number.is_empty() || !number.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let code = u32::from_str_radix(number, radix).ok()?;
    let ch = char::from_u32(code)?;
    Some((ch, 2 + digits_start + end + 1))
}

fn decode_named(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    'outer: while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        for (entity, replacement) in NAMED_ENTITIES {
            if candidate.starts_with(entity) {
                out.push_str(replacement);
                rest = &candidate[entity.len()..];
                continue 'outer;
            }
        }
        out.push('&');
        rest = &candidate[1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ampersand_in_every_form() {
        assert_eq!(decode_entities("&#x26;"), "&");
        assert_eq!(decode_entities("&#38;"), "&");
        assert_eq!(decode_entities("&amp;"), "&");
    }

    #[test]
    fn astral_code_point_decodes_to_single_char() {
        assert_eq!(decode_entities("&#x1F600;"), "\u{1F600}");
        assert_eq!(decode_entities("&#128512;"), "\u{1F600}");
        assert_eq!(decode_entities("&#x1f600;").chars().count(), 1);
    }

    #[test]
    fn named_table() {
        assert_eq!(
            decode_entities("&lt;b&gt; &quot;hi&quot; it&#39;s"),
            "<b> \"hi\" it's"
        );
    }

    #[test]
    fn invalid_numeric_left_verbatim() {
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_entities("&#12a;"), "&#12a;");
        assert_eq!(decode_entities("&#;"), "&#;");
        assert_eq!(decode_entities("&#38"), "&#38");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn named_output_is_not_re_escaped() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }

    #[test]
    fn unknown_named_reference_kept() {
        assert_eq!(decode_entities("Tom &hearts; Jerry & co"), "Tom &hearts; Jerry & co");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(decode_entities(""), "");
        assert_eq!(decode_entities("caption with no refs"), "caption with no refs");
    }
}
