//! Application configuration for elemdoc.
//!
//! User config lives at `~/.elemdoc/elemdoc.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ElemdocError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "elemdoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".elemdoc";

/// Placeholder substituted with the element identifier in the URL template.
pub const ELEMENT_PLACEHOLDER: &str = "{element}";

// ---------------------------------------------------------------------------
// Config structs (matching elemdoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where element files live.
    #[serde(default)]
    pub source: SourceConfig,

    /// Documentation site settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Classification markers and header text.
    #[serde(default)]
    pub markers: MarkersConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Root directory scanned recursively for element files.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// File extension of element files, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            extension: default_extension(),
        }
    }
}

fn default_root_dir() -> String {
    "Sources/HTML Elements".into()
}
fn default_extension() -> String {
    "swift".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Documentation page URL with `{element}` in place of the identifier.
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// CSS selector of the page's primary content container.
    #[serde(default = "default_content_selector")]
    pub content_selector: String,

    /// Pause after each successful enrichment, in milliseconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Element identifier -> page slug, for pages not named after the tag.
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            user_agent: default_user_agent(),
            content_selector: default_content_selector(),
            request_delay_ms: default_request_delay(),
            timeout_secs: default_timeout(),
            aliases: default_aliases(),
        }
    }
}

fn default_url_template() -> String {
    "https://developer.mozilla.org/en-US/docs/Web/HTML/Element/{element}".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36"
        .into()
}
fn default_content_selector() -> String {
    "article".into()
}
fn default_request_delay() -> u64 {
    2000
}
fn default_timeout() -> u64 {
    30
}
fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("h1-h6".to_string(), "Heading_Elements".to_string())])
}

/// `[markers]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersConfig {
    /// Identifiers that must all appear in code for a file to count as implemented.
    #[serde(default = "default_implementation_markers")]
    pub implementation: Vec<String>,

    /// Phrases that, found in any comment, mean the file is already documented.
    #[serde(default = "default_documentation_markers")]
    pub documentation: Vec<String>,

    /// Title written into every documentation header.
    #[serde(default = "default_doc_title")]
    pub doc_title: String,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            implementation: default_implementation_markers(),
            documentation: default_documentation_markers(),
            doc_title: default_doc_title(),
        }
    }
}

fn default_implementation_markers() -> Vec<String> {
    vec!["struct".into(), "public".into()]
}
fn default_documentation_markers() -> Vec<String> {
    vec![
        "MDN Documentation".into(),
        "Source: https://developer.mozilla.org".into(),
    ]
}
fn default_doc_title() -> String {
    "MDN Documentation".into()
}

// ---------------------------------------------------------------------------
// Enrich config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime enrichment configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Root directory to scan.
    pub root_dir: PathBuf,
    /// Element file extension, without the dot.
    pub extension: String,
    /// Documentation URL template containing `{element}`.
    pub url_template: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// CSS selector for the content region.
    pub content_selector: String,
    /// Delay after each successful enrichment.
    pub request_delay: Duration,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Identifier -> page slug overrides.
    pub aliases: BTreeMap<String, String>,
    /// Implementation identifiers (all required).
    pub implementation_markers: Vec<String>,
    /// Documentation phrases (any suffices).
    pub documentation_markers: Vec<String>,
    /// Header title.
    pub doc_title: String,
}

impl From<&AppConfig> for EnrichConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            root_dir: PathBuf::from(&config.source.root_dir),
            extension: config.source.extension.clone(),
            url_template: config.fetch.url_template.clone(),
            user_agent: config.fetch.user_agent.clone(),
            content_selector: config.fetch.content_selector.clone(),
            request_delay: Duration::from_millis(config.fetch.request_delay_ms),
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            aliases: config.fetch.aliases.clone(),
            implementation_markers: config.markers.implementation.clone(),
            documentation_markers: config.markers.documentation.clone(),
            doc_title: config.markers.doc_title.clone(),
        }
    }
}

impl EnrichConfig {
    /// Check the settings a run depends on before touching any file.
    pub fn validate(&self) -> Result<()> {
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(ElemdocError::config("source.extension must not be empty"));
        }

        if !self.url_template.contains(ELEMENT_PLACEHOLDER) {
            return Err(ElemdocError::config(format!(
                "fetch.url_template must contain {ELEMENT_PLACEHOLDER}: {}",
                self.url_template
            )));
        }
        let sample = self.url_template.replace(ELEMENT_PLACEHOLDER, "p");
        Url::parse(&sample).map_err(|e| {
            ElemdocError::config(format!(
                "fetch.url_template is not a valid URL ({e}): {}",
                self.url_template
            ))
        })?;

        if self.content_selector.trim().is_empty() {
            return Err(ElemdocError::config("fetch.content_selector must not be empty"));
        }

        if self.implementation_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ElemdocError::config(
                "markers.implementation needs at least one identifier",
            ));
        }
        if self.documentation_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ElemdocError::config(
                "markers.documentation needs at least one phrase",
            ));
        }
        if self.doc_title.trim().is_empty() {
            return Err(ElemdocError::config("markers.doc_title must not be empty"));
        }

        Ok(())
    }

    /// Build the documentation URL for an element identifier, applying aliases.
    pub fn doc_url(&self, element: &str) -> String {
        let slug = self
            .aliases
            .get(element)
            .map(String::as_str)
            .unwrap_or(element);
        self.url_template.replace(ELEMENT_PLACEHOLDER, slug)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.elemdoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ElemdocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.elemdoc/elemdoc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ElemdocError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ElemdocError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ElemdocError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ElemdocError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ElemdocError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("url_template"));
        assert!(toml_str.contains("developer.mozilla.org"));
        assert!(toml_str.contains("Heading_Elements"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[source]
root_dir = "/tmp/elements"

[fetch]
request_delay_ms = 0
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.root_dir, "/tmp/elements");
        assert_eq!(config.source.extension, "swift");
        assert_eq!(config.fetch.request_delay_ms, 0);
        assert_eq!(config.fetch.content_selector, "article");
        assert_eq!(config.markers.implementation, vec!["struct", "public"]);
    }

    #[test]
    fn enrich_config_from_app_config() {
        let app = AppConfig::default();
        let enrich = EnrichConfig::from(&app);
        assert_eq!(enrich.request_delay, Duration::from_secs(2));
        assert_eq!(enrich.timeout, Duration::from_secs(30));
        assert_eq!(enrich.doc_title, "MDN Documentation");
        assert!(enrich.validate().is_ok());
    }

    #[test]
    fn doc_url_substitutes_and_aliases() {
        let enrich = EnrichConfig::from(&AppConfig::default());
        assert_eq!(
            enrich.doc_url("nav"),
            "https://developer.mozilla.org/en-US/docs/Web/HTML/Element/nav"
        );
        assert_eq!(
            enrich.doc_url("h1-h6"),
            "https://developer.mozilla.org/en-US/docs/Web/HTML/Element/Heading_Elements"
        );
    }

    #[test]
    fn validate_rejects_template_without_placeholder() {
        let mut enrich = EnrichConfig::from(&AppConfig::default());
        enrich.url_template = "https://example.org/docs".into();
        let err = enrich.validate().unwrap_err();
        assert!(err.to_string().contains("{element}"));
    }

    #[test]
    fn validate_rejects_empty_markers() {
        let mut enrich = EnrichConfig::from(&AppConfig::default());
        enrich.documentation_markers = vec![String::new()];
        assert!(enrich.validate().is_err());

        let mut enrich = EnrichConfig::from(&AppConfig::default());
        enrich.extension = ".".into();
        assert!(enrich.validate().is_err());
    }
}
