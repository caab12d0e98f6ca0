//! Link helpers: URL normalization and validation, paste detection, and
//! title derivation for quick-added bookmarks.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

/// Image extensions accepted for favicon URLs.
const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".bmp",
];

/// Title used when no domain can be derived.
pub const FALLBACK_TITLE: &str = "New Bookmark";

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://[^\s]+)").expect("link pattern is valid"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9\-_äöüÄÖÜßéèêàáâóòôúùûéèëïöü]+$").expect("tag pattern is valid")
});

/// Trim the URL and drop a bare `/` path. Unparsable input is returned trimmed.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let Ok(parsed) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    let serialized = parsed.to_string();
    if parsed.path() == "/" && parsed.query().is_none() && parsed.fragment().is_none() {
        if let Some(stripped) = serialized.strip_suffix('/') {
            return stripped.to_string();
        }
    }
    serialized
}

/// Whether the string parses as an absolute URL.
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

/// Blank is allowed; anything else must be a URL ending in an image extension.
pub fn is_valid_image_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return true;
    }
    if !is_valid_url(url) {
        return false;
    }
    let lower = url.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

pub fn is_valid_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag.trim())
}

/// Return the leading `http(s)://` link of pasted text, if any.
pub fn detect_link(text: &str) -> Option<&str> {
    LINK_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Derive a display title from a URL's host.
///
/// `https://www.news.example.com` becomes `News Example`.
pub fn extract_domain_name(url: &str) -> String {
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
    else {
        return FALLBACK_TITLE.to_string();
    };

    let host = host.strip_prefix("www.").unwrap_or(&host);
    let mut parts: Vec<&str> = host.split('.').collect();
    if parts.len() > 1 {
        parts.pop();
    }

    let title = parts
        .iter()
        .map(|part| capitalize(part))
        .collect::<Vec<_>>()
        .join(" ");

    if title.trim().is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
