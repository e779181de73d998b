//! Readable-text extraction from a documentation page.
//!
//! Locates the page's primary content region, flattens it to one text block
//! per line, then runs a small normalization pipeline over the result.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use elemdoc_shared::{ElemdocError, Result};

/// Elements whose text is never human-readable page content.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract normalized text from the first element matching `selector`.
///
/// Fails when the region is missing or holds no text.
pub fn extract_text(html: &str, selector: &Selector) -> Result<String> {
    let doc = Html::parse_document(html);

    let Some(region) = doc.select(selector).next() else {
        return Err(ElemdocError::extract("content region not found"));
    };

    let mut blocks = Vec::new();
    collect_text(region, &mut blocks);

    let text = normalize(&blocks.join("\n"));
    if text.is_empty() {
        return Err(ElemdocError::extract("content region has no text"));
    }
    Ok(text)
}

/// Parse a CSS selector, reporting failures as config errors.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| {
        ElemdocError::config(format!("invalid content selector '{selector}': {e}"))
    })
}

/// Depth-first walk pushing every trimmed, non-empty text node.
fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if SKIP_TAGS.contains(&child_el.value().name()) {
                continue;
            }
            collect_text(child_el, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization passes
// ---------------------------------------------------------------------------

/// Run the whitespace normalization passes in order.
pub(crate) fn normalize(text: &str) -> String {
    let mut result = text.to_string();

    result = collapse_newlines(&result);
    result = collapse_spaces(&result);

    result.trim_matches('\n').to_string()
}

/// Runs of line breaks become a single one (no blank lines survive).
fn collapse_newlines(text: &str) -> String {
    static NEWLINES_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n+").expect("valid regex"));

    NEWLINES_RE.replace_all(text, "\n").to_string()
}

/// Runs of spaces become a single space. Tabs and line breaks are left alone.
fn collapse_spaces(text: &str) -> String {
    static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));

    SPACES_RE.replace_all(text, " ").to_string()
}
