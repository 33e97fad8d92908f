//! URL normalization for bookmark storage and duplicate detection.
//!
//! Everything here is total: malformed input is passed through rather than
//! rejected, so a bad URL never blocks the create or lookup flows.

use url::Url;

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Returns true when `raw` starts with `http://` or `https://` (ASCII case-insensitive).
pub fn has_scheme(raw: &str) -> bool {
    scheme_len(raw).is_some()
}

fn scheme_len(raw: &str) -> Option<usize> {
    [HTTP_PREFIX, HTTPS_PREFIX].iter().find_map(|prefix| {
        raw.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| prefix.len())
    })
}

/// Maps raw user input to a canonical absolute URL string.
///
/// - empty input is returned as-is;
/// - schemed input is parsed and re-serialized;
/// - schemeless input gets `http://` prepended first;
/// - if parsing fails the original input is returned unchanged.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let candidate = if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("{HTTP_PREFIX}{raw}")
    };
    match Url::parse(&candidate) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Prepends `http://` when the scheme is missing. No parsing is involved.
pub fn ensure_scheme(raw: &str) -> String {
    if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("{HTTP_PREFIX}{raw}")
    }
}

/// Removes a leading `http://` or `https://`, if present.
pub fn strip_scheme(raw: &str) -> &str {
    match scheme_len(raw) {
        Some(len) => &raw[len..],
        None => raw,
    }
}

/// Builds the lookup variant set used by the exists query.
///
/// The literal input always comes first. Schemeless input adds both
/// schemed forms; schemed input adds the schemeless form. Empty variants
/// are dropped since they would match every stored URL as a substring.
pub fn lookup_variants(raw: &str) -> Vec<String> {
    let mut variants = vec![raw.to_string()];
    if has_scheme(raw) {
        variants.push(strip_scheme(raw).to_string());
    } else {
        variants.push(format!("{HTTP_PREFIX}{raw}"));
        variants.push(format!("{HTTPS_PREFIX}{raw}"));
    }
    let mut unique: Vec<String> = Vec::with_capacity(variants.len());
    for variant in variants {
        if !variant.is_empty() && !unique.contains(&variant) {
            unique.push(variant);
        }
    }
    unique
}

/// Extracts the host of an absolute URL, if it has one.
pub fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}
