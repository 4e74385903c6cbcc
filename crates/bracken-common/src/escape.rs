//! HTML entity escaping and URI scheme checks.
//!
//! The serializers escape every piece of text and every attribute value they
//! emit through this module, and the fragment reader reverses the same small
//! entity set. The engine is not a general sanitizer; this covers exactly the
//! constructs it produces itself.

/// Escape text for inclusion in HTML element content or attribute values.
///
/// Covers the five characters that can change HTML structure. Everything
/// else passes through untouched.
#[must_use]
pub fn entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`entities`], plus the handful of references commonly found in
/// externally-edited fragments (`&nbsp;`, numeric references).
///
/// Unrecognized or malformed references are kept verbatim; this function
/// never fails.
#[must_use]
pub fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match take_entity(rest) {
            Some((replacement, len)) => {
                out.push_str(&replacement);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Try to decode one entity at the start of `text` (which begins with `&`).
/// Returns the decoded string and the number of input bytes consumed.
fn take_entity(text: &str) -> Option<(String, usize)> {
    let semi = text.find(';')?;
    // Entity names are short; an unmatched '&' far from any ';' is plain text.
    if semi > 10 {
        return None;
    }
    let body = &text[1..semi];
    let named = match body {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{a0}"),
        _ => None,
    };
    if let Some(s) = named {
        return Some((s.to_string(), semi + 1));
    }
    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    let c = code.and_then(char::from_u32)?;
    Some((c.to_string(), semi + 1))
}

/// URI schemes the engine will emit in `href`/`src` attributes.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];

/// Reject URIs with a dangerous scheme (`javascript:`, `data:`, ...).
///
/// Scheme-less (relative) URIs and URIs with an allowed scheme are returned
/// unchanged; anything else collapses to `"#"` so the emitted link is inert.
#[must_use]
pub fn sanitize_uri(uri: &str) -> &str {
    match uri.split_once(':') {
        Some((scheme, _))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '.' || c == '-')
                && !scheme.chars().next().is_some_and(|c| c.is_ascii_digit()) =>
        {
            if ALLOWED_SCHEMES
                .iter()
                .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
            {
                uri
            } else {
                "#"
            }
        }
        _ => uri,
    }
}
