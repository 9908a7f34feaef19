//! Structural checks for generated files.

use once_cell::sync::Lazy;
use regex::Regex;

static CSS_RULE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^{}]+\{[^{}]+\}").unwrap());
static EXTERNAL_SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<script[^>]+src=["']https?://"#).unwrap());
static EXTERNAL_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<link[^>]+href=["']https?://"#).unwrap());
static EXTERNAL_IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src=["']https?://"#).unwrap());

/// Minimal HTML structure check: a doctype or `<html>` marker plus a
/// `<body>` marker.
pub fn html_structure(html: &str) -> bool {
    if html.trim().is_empty() {
        return false;
    }
    let lower = html.to_lowercase();
    let has_document = lower.contains("<!doctype") || lower.contains("<html");
    let has_body = lower.contains("<body");
    has_document && has_body
}

/// Whether the CSS contains at least one `selector { properties }` rule.
pub fn css_has_rule(css: &str) -> bool {
    CSS_RULE_RE.is_match(css)
}

/// Whether the HTML pulls in external scripts, stylesheets or images.
/// The generated apps are meant to be fully self-contained.
pub fn has_external_dependencies(html: &str) -> bool {
    EXTERNAL_SCRIPT_RE.is_match(html)
        || EXTERNAL_LINK_RE.is_match(html)
        || EXTERNAL_IMG_RE.is_match(html)
}

/// Whether `content` fits within `max_kb` kilobytes of UTF-8.
pub fn within_size(content: &str, max_kb: usize) -> bool {
    content.len() <= max_kb * 1024
}
