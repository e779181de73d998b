//! Core enrichment logic for elemdoc.
//!
//! This crate ties together file discovery, classification, documentation
//! fetching, and comment merging into the end-to-end enrichment run.

pub mod classify;
pub mod element;
pub mod merge;
pub mod pipeline;
pub mod walker;

pub use classify::{
    Classification, Markers, classify, has_documentation, inspect_file, is_implemented,
};
pub use element::{element_name_for_path, extract_element_name};
pub use merge::{format_as_comments, merge, write_atomic};
pub use pipeline::{
    Enricher, FileOutcome, ProgressReporter, RunSummary, ScanEntry, SilentProgress, SkipReason,
    scan_tree, select,
};
pub use walker::discover_element_files;
