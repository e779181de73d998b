//! Element file discovery.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use elemdoc_shared::{ElemdocError, Result};

/// Recursively find element files under `root`, sorted by path.
///
/// An element file's name starts with `<` and ends with `.{extension}`.
/// Unreadable directory entries below the root are logged and skipped.
pub fn discover_element_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ElemdocError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "root is not a directory"),
        ));
    }

    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_element_file_name(&name, &suffix) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!(root = %root.display(), count = files.len(), "discovered element files");
    Ok(files)
}

fn is_element_file_name(name: &str, suffix: &str) -> bool {
    name.starts_with('<') && name.ends_with(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir() -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("elemdoc-walker-test-{}", uuid::Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn finds_nested_element_files_sorted() {
        let tmp = temp_dir();
        fs::create_dir_all(tmp.join("Input")).unwrap();
        fs::write(tmp.join("<p> Paragraph.swift"), "").unwrap();
        fs::write(tmp.join("<a> Anchor.swift"), "").unwrap();
        fs::write(tmp.join("Input").join("<input> Input.swift"), "").unwrap();
        fs::write(tmp.join("Label.swift"), "").unwrap();
        fs::write(tmp.join("<p> Notes.md"), "").unwrap();

        let files = discover_element_files(&tmp, "swift").unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&tmp).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(
            rel,
            vec!["<a> Anchor.swift", "<p> Paragraph.swift", "Input/<input> Input.swift"]
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn extension_accepts_leading_dot() {
        let tmp = temp_dir();
        fs::write(tmp.join("<nav>.impl"), "").unwrap();

        assert_eq!(discover_element_files(&tmp, ".impl").unwrap().len(), 1);
        assert_eq!(discover_element_files(&tmp, "impl").unwrap().len(), 1);
        assert!(discover_element_files(&tmp, "swift").unwrap().is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_root_is_an_error() {
        let missing =
            std::env::temp_dir().join(format!("elemdoc-missing-{}", uuid::Uuid::now_v7()));
        assert!(discover_element_files(&missing, "swift").is_err());
    }
}
