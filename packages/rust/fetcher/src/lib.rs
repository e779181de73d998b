//! Documentation page fetching and text extraction.
//!
//! This crate provides:
//! - [`DocSource`]: where the enricher gets documentation text from
//! - [`DocFetcher`]: the HTTP implementation backed by `reqwest` + `scraper`
//! - [`extract_text`]: content-region flattening and whitespace normalization

pub mod client;
pub mod extract;

use std::future::Future;

use elemdoc_shared::{FetchedDoc, Result};

pub use client::DocFetcher;
pub use extract::{extract_text, parse_selector};

/// A source of documentation text for element identifiers.
///
/// Implementations report every failure (HTTP status, transport, missing
/// content) as an error; callers decide whether to skip or abort.
pub trait DocSource: Send + Sync {
    /// Fetch the documentation for `element`.
    fn fetch(&self, element: &str) -> impl Future<Output = Result<FetchedDoc>> + Send;
}
