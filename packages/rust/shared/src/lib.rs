//! Shared types, error model, and configuration for morphdict.
//!
//! This crate is the foundation depended on by all other morphdict crates.
//! It provides:
//! - The unified error type ([`MorphDictError`])
//! - Domain types ([`DictMeta`], [`VersionStamp`])
//! - Configuration ([`RebuildConfig`], [`RebuildFlags`])

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CORPUS_FILE_NAME, DATA_DIR_NAME, DEFAULT_SOURCE_URL, RebuildConfig, RebuildFlags,
    VERSION_FILE_NAME, root_from_env, source_url_from_env,
};
pub use error::{MorphDictError, Result};
pub use types::{CURRENT_FORMAT_VERSION, DictMeta, SOURCE_REVISION_KEY, VersionStamp};
