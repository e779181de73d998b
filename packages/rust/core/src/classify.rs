//! File classification: implemented or stub, documented or not.
//!
//! Content is run through a small lexer for C-family sources (Swift, Rust,
//! and friends) that separates code from comments and string literals.
//! Implementation markers count only as whole identifiers in code;
//! documentation markers count only inside comments. A word like `struct`
//! inside a fetched documentation comment therefore never makes a stub look
//! implemented.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use elemdoc_shared::EnrichConfig;

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Marker strings used to classify element files.
#[derive(Debug, Clone)]
pub struct Markers {
    /// All must appear in code.
    pub implementation: Vec<String>,
    /// Any one appearing in a comment suffices.
    pub documentation: Vec<String>,
}

impl From<&EnrichConfig> for Markers {
    /// The header title is always a documentation marker: every generated
    /// header carries it in a comment, so enriched files stay recognizable
    /// whatever the configured marker phrases are.
    fn from(config: &EnrichConfig) -> Self {
        let mut documentation = non_empty(&config.documentation_markers);
        let title = config.doc_title.trim();
        if !title.is_empty() && !documentation.iter().any(|m| m == title) {
            documentation.push(title.to_string());
        }
        Self {
            implementation: non_empty(&config.implementation_markers),
            documentation,
        }
    }
}

fn non_empty(markers: &[String]) -> Vec<String> {
    markers
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Derived state of one element file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// The file could be read.
    pub readable: bool,
    /// Every implementation marker appears in code.
    pub implemented: bool,
    /// A documentation block is already present.
    pub documented: bool,
}

impl Classification {
    /// State reported for a file that could not be read: treated as already
    /// documented so that nothing rewrites a file it could not inspect.
    pub fn unreadable() -> Self {
        Self {
            readable: false,
            implemented: false,
            documented: true,
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.readable, self.implemented, self.documented) {
            (false, _, _) => "unreadable",
            (true, true, true) => "implemented, documented",
            (true, true, false) => "implemented",
            (true, false, true) => "stub, documented",
            (true, false, false) => "stub",
        }
    }
}

/// Classify in-memory file content.
pub fn classify(content: &str, markers: &Markers) -> Classification {
    let scan = scan_source(content);
    Classification {
        readable: true,
        implemented: scan.is_implemented(markers),
        documented: scan.is_documented(markers),
    }
}

/// Read and classify a file. Read failures are logged and fail safe.
pub fn inspect_file(path: &Path, markers: &Markers) -> Classification {
    match std::fs::read_to_string(path) {
        Ok(content) => classify(&content, markers),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read file");
            Classification::unreadable()
        }
    }
}

/// Whether the content implements the element.
pub fn is_implemented(content: &str, markers: &Markers) -> bool {
    scan_source(content).is_implemented(markers)
}

/// Whether the content already carries documentation.
pub fn has_documentation(content: &str, markers: &Markers) -> bool {
    scan_source(content).is_documented(markers)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Code and comment text of a source file, with string literals dropped.
#[derive(Debug, Default)]
pub(crate) struct SourceScan {
    /// Identifiers seen in code.
    identifiers: HashSet<String>,
    /// Code with comments and string literals replaced by a space.
    code: String,
    /// Comment bodies, one per line.
    comments: String,
}

impl SourceScan {
    fn is_implemented(&self, markers: &Markers) -> bool {
        !markers.implementation.is_empty()
            && markers.implementation.iter().all(|marker| {
                if is_identifier(marker) {
                    self.identifiers.contains(marker)
                } else {
                    self.code.contains(marker.as_str())
                }
            })
    }

    fn is_documented(&self, markers: &Markers) -> bool {
        markers
            .documentation
            .iter()
            .any(|marker| self.comments.contains(marker.as_str()))
    }

    fn end_word(&mut self, word: &mut String) {
        if !word.is_empty() {
            self.identifiers.insert(std::mem::take(word));
        }
    }

    fn push_comment(&mut self, body: &[char]) {
        self.comments.extend(body);
        self.comments.push('\n');
        self.code.push(' ');
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_identifier_char)
}

/// Split `src` into identifiers, code text and comment text.
pub(crate) fn scan_source(src: &str) -> SourceScan {
    let chars: Vec<char> = src.chars().collect();
    let mut scan = SourceScan::default();
    let mut word = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_identifier_char(c) {
            word.push(c);
            scan.code.push(c);
            i += 1;
            continue;
        }
        scan.end_word(&mut word);

        match (c, chars.get(i + 1).copied()) {
            ('/', Some('/')) => {
                let end = chars[i..]
                    .iter()
                    .position(|&ch| ch == '\n')
                    .map_or(chars.len(), |p| i + p);
                scan.push_comment(&chars[i + 2..end]);
                i = end;
            }
            ('/', Some('*')) => {
                let (body_end, next) = block_comment_end(&chars, i + 2);
                scan.push_comment(&chars[i + 2..body_end]);
                i = next;
            }
            ('"', _) => {
                i = string_end(&chars, i);
                scan.code.push(' ');
            }
            _ => {
                scan.code.push(c);
                i += 1;
            }
        }
    }
    scan.end_word(&mut word);

    scan
}

/// Returns (end of comment body, index after the closing `*/`). Nested
/// `/* */` pairs are balanced; an unterminated comment runs to the end.
fn block_comment_end(chars: &[char], start: usize) -> (usize, usize) {
    let mut depth = 1usize;
    let mut j = start;
    while j < chars.len() {
        match (chars[j], chars.get(j + 1).copied()) {
            ('/', Some('*')) => {
                depth += 1;
                j += 2;
            }
            ('*', Some('/')) => {
                depth -= 1;
                if depth == 0 {
                    return (j, j + 2);
                }
                j += 2;
            }
            _ => j += 1,
        }
    }
    (chars.len(), chars.len())
}

/// Index just past the string literal opening at `start`.
fn string_end(chars: &[char], start: usize) -> usize {
    let is_triple = |at: usize| chars.get(at..at + 3) == Some(&['"', '"', '"'][..]);

    if is_triple(start) {
        let mut j = start + 3;
        while j < chars.len() {
            if chars[j] == '\\' {
                j += 2;
            } else if is_triple(j) {
                return j + 3;
            } else {
                j += 1;
            }
        }
        return chars.len();
    }

    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '"' => return j + 1,
            // Unterminated single-line literal stops at the line end.
            '\n' => return j,
            _ => j += 1,
        }
    }
    chars.len()
}
