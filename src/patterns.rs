//! Cached regex patterns.
//!
//! Uses LazyLock to compile patterns once on first use.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Matches the `<!-- ePub title: "..." -->` marker naming a chapter.
pub static CHAPTER_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!-- ePub title: "([^"]+)" -->"#).unwrap()
});

/// Extract the chapter title from a content document, if it declares one.
pub fn chapter_title(text: &str) -> Option<&str> {
    CHAPTER_TITLE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
