//! Plain-text excerpt extraction from reference pages.
//!
//! Only paragraph, sub-heading and list-item text is kept. Short fragments
//! (navigation labels, buttons, cookie banners) are dropped, the rest is
//! joined with blank lines and capped to a fixed character count.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static TEXT_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, h2, h3, li").expect("valid selector"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extract an excerpt from `html`.
///
/// Fragments of `min_fragment_chars` characters or fewer are skipped; the
/// result never exceeds `max_chars` characters.
pub fn extract_excerpt(html: &str, min_fragment_chars: usize, max_chars: usize) -> String {
    let doc = Html::parse_document(html);

    let mut excerpt = String::new();
    for el in doc.select(&TEXT_BLOCKS) {
        let raw = el.text().collect::<String>();
        let text = WHITESPACE_RE.replace_all(raw.trim(), " ");
        if text.chars().count() <= min_fragment_chars {
            continue;
        }

        if !excerpt.is_empty() {
            excerpt.push_str("\n\n");
        }
        excerpt.push_str(&text);

        // Everything past the cap is discarded anyway.
        if excerpt.len() > max_chars.saturating_mul(4) {
            break;
        }
    }

    truncate_chars(&excerpt, max_chars)
}

/// Keep at most `max_chars` characters, cutting on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
