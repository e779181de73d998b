//! Core domain types shared across elemdoc crates.

use serde::{Deserialize, Serialize};

use crate::error::ElemdocError;

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Which files a run targets and where the documentation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    /// Implemented, undocumented files; documentation appended at the end.
    Append,
    /// Stub files; documentation prepended above the placeholder body.
    Prepend,
}

impl Workflow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
        }
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Workflow {
    type Err = ElemdocError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            other => Err(ElemdocError::validation(format!(
                "unknown workflow '{other}': expected 'append' or 'prepend'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// FetchedDoc
// ---------------------------------------------------------------------------

/// Readable text of one documentation page plus the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDoc {
    /// Normalized plain text, one block per line.
    pub text: String,
    /// The exact URL that was requested.
    pub url: String,
}
