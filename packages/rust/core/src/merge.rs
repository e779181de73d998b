//! Comment formatting, header templates, and file rewriting.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use elemdoc_shared::{ElemdocError, FetchedDoc, Result, Workflow};

/// Prefix of every generated comment line.
pub const LINE_COMMENT: &str = "//";

/// Turn each line of `text` into a `//` comment. Empty lines become a bare
/// `//`, so the output has exactly as many lines as the input.
pub fn format_as_comments(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                LINE_COMMENT.to_string()
            } else {
                format!("{LINE_COMMENT} {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Block-comment header placed after an implementation.
pub fn append_header(title: &str, url: &str) -> String {
    format!("/* {title}\n * Source: {url}\n */")
}

/// Line-comment header placed above a stub.
pub fn prepend_header(element: &str, title: &str, url: &str) -> String {
    format!(
        "{LINE_COMMENT}<{element}>: {title}\n{LINE_COMMENT}\n\
         {LINE_COMMENT} Source: {url}\n{LINE_COMMENT}"
    )
}

/// Combine `original` with the fetched documentation for `workflow`.
///
/// The original content is carried over byte-for-byte: it stays the prefix
/// of the result when appending and becomes its suffix when prepending.
pub fn merge(
    workflow: Workflow,
    original: &str,
    element: &str,
    title: &str,
    doc: &FetchedDoc,
) -> String {
    let body = format_as_comments(&doc.text);
    match workflow {
        Workflow::Append => {
            let header = append_header(title, &doc.url);
            format!("{original}\n\n{header}\n{body}")
        }
        Workflow::Prepend => {
            let header = prepend_header(element, title, &doc.url);
            format!("{header}\n{body}\n\n{original}")
        }
    }
}

// ---------------------------------------------------------------------------
// Atomic write
// ---------------------------------------------------------------------------

/// Replace the file at `path` with `content`.
///
/// The content goes to a sibling temporary file that is then renamed over
/// `path`. On failure the temporary file is removed and `path` is untouched.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp = temp_path_for(path)?;

    if let Err(e) = write_temp(path, &temp, content) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(ElemdocError::io(path, e));
    }

    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        ElemdocError::validation(format!("not a file path: {}", path.display()))
    })?;
    let temp_name = format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::now_v7()
    );
    Ok(path.with_file_name(temp_name))
}

fn write_temp(original: &Path, temp: &Path, content: &str) -> Result<()> {
    let mut file = fs::File::create(temp).map_err(|e| ElemdocError::io(temp, e))?;
    file.write_all(content.as_bytes()).map_err(|e| ElemdocError::io(temp, e))?;
    file.sync_all().map_err(|e| ElemdocError::io(temp, e))?;

    // Keep the original's permission bits on the replacement.
    if let Ok(meta) = fs::metadata(original) {
        fs::set_permissions(temp, meta.permissions()).map_err(|e| ElemdocError::io(temp, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, url: &str) -> FetchedDoc {
        FetchedDoc {
            text: text.into(),
            url: url.into(),
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("elemdoc-merge-test-{}", uuid::Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn comments_one_line_per_input_line() {
        let text = "First line\n\nThird line\n";
        let out = format_as_comments(text);
        assert_eq!(out, "// First line\n//\n// Third line\n//");
        assert_eq!(out.split('\n').count(), text.split('\n').count());
        assert!(out.split('\n').all(|l| l.starts_with("//")));
    }

    #[test]
    fn comments_single_line() {
        assert_eq!(format_as_comments("Navigation section."), "// Navigation section.");
        assert_eq!(format_as_comments(""), "//");
    }

    #[test]
    fn append_keeps_original_prefix() {
        let original = "public struct Paragraph {}\n";
        let merged = merge(
            Workflow::Append,
            original,
            "p",
            "MDN Documentation",
            &doc("The paragraph element.\nBlock-level.", "https://example.org/p"),
        );

        assert!(merged.starts_with(original));
        assert_eq!(
            &merged[original.len()..],
            "\n\n/* MDN Documentation\n * Source: https://example.org/p\n */\n\
             // The paragraph element.\n// Block-level."
        );
    }

    #[test]
    fn prepend_keeps_original_suffix() {
        let original = "// TODO: implement <rtc>\n";
        let merged = merge(
            Workflow::Prepend,
            original,
            "rtc",
            "MDN Documentation",
            &doc("Ruby text container.", "https://example.org/rtc"),
        );

        assert!(merged.ends_with(original));
        assert_eq!(
            merged,
            "//<rtc>: MDN Documentation\n//\n// Source: https://example.org/rtc\n//\n\
             // Ruby text container.\n\n// TODO: implement <rtc>\n"
        );
    }

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_temp() {
        let tmp = temp_dir();
        let path = tmp.join("<p> Paragraph.swift");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
        let leftovers: Vec<_> = fs::read_dir(&tmp)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_atomic_fails_without_touching_anything() {
        let missing_dir =
            std::env::temp_dir().join(format!("elemdoc-merge-missing-{}", uuid::Uuid::now_v7()));
        let path = missing_dir.join("<p> Paragraph.swift");

        let err = write_atomic(&path, "content").unwrap_err();
        assert!(matches!(err, ElemdocError::Io { .. }));
        assert!(!missing_dir.exists());
    }
}
