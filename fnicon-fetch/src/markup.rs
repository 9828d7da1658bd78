//! Narrow pattern scanning of homepage HTML.
//!
//! This is not a markup parser. It recognizes the two shapes the icon
//! cascade cares about and nothing else.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Any `<link ...>` tag.
static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<link\b[^>]*>").expect("Invalid regex"));

/// `rel="icon"` or `rel="shortcut icon"` inside a tag.
static REL_ICON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\brel\s*=\s*["'](?:shortcut\s+)?icon["']"#).expect("Invalid regex")
});

/// `href="..."` inside a tag.
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*["']([^"']+)["']"#).expect("Invalid regex")
});

/// `<img ... src="....jpg|png|ico">`.
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*\bsrc\s*=\s*["']([^"']+\.(?:jpg|png|ico))["']"#)
        .expect("Invalid regex")
});

/// Returns the `href` of the first icon `<link>` tag.
///
/// Attribute order within the tag does not matter.
pub fn find_link_icon(html: &str) -> Option<&str> {
    LINK_TAG
        .find_iter(html)
        .map(|tag| tag.as_str())
        .filter(|tag| REL_ICON.is_match(tag))
        .find_map(|tag| {
            HREF.captures(tag)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
        })
}

/// Returns the `src` of the first `<img>` pointing at a `.jpg`, `.png`
/// or `.ico` file.
pub fn find_img_src(html: &str) -> Option<&str> {
    IMG_SRC
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// Resolves `reference` against `origin` (`scheme://host[:port]`).
///
/// Absolute references are returned normalized; relative and
/// protocol-relative ones are joined.
pub fn resolve_against(origin: &str, reference: &str) -> Option<String> {
    let base = Url::parse(origin).ok()?;
    base.join(reference).ok().map(String::from)
}
