//! Element identifiers derived from file names.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Identifier between the first `<` and the following `>`, e.g. `nav` for
/// `<nav> Navigation Section.swift`. `None` when there is no non-empty token.
pub fn extract_element_name(file_name: &str) -> Option<&str> {
    static ELEMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<([^>]+)>").expect("valid regex"));

    ELEMENT_RE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Same as [`extract_element_name`], applied to the last component of `path`.
pub fn element_name_for_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    extract_element_name(&file_name).map(str::to_string)
}
