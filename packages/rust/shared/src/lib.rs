//! Shared types, error model, and configuration for elemdoc.
//!
//! This crate is the foundation depended on by all other elemdoc crates.
//! It provides:
//! - [`ElemdocError`]: the unified error type
//! - Domain types ([`Workflow`], [`FetchedDoc`])
//! - Configuration ([`AppConfig`], [`EnrichConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ELEMENT_PLACEHOLDER, EnrichConfig, FetchConfig, MarkersConfig, SourceConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{ElemdocError, Result};
pub use types::{FetchedDoc, Workflow};
