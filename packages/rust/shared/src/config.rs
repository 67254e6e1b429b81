//! Rebuild configuration for morphdict.
//!
//! There is no config file. Every fixed location the pipeline touches lives in
//! [`RebuildConfig`], derived from a root directory (`MORPHDICT_ROOT`, else the
//! working directory). The upstream URL can be overridden with
//! `MORPHDICT_SOURCE_URL`.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{MorphDictError, Result};
use crate::types::CURRENT_FORMAT_VERSION;

/// File name of the raw corpus export under the root.
pub const CORPUS_FILE_NAME: &str = "dict.xml";

/// Directory under the root that holds the compiled data and its version file.
pub const DATA_DIR_NAME: &str = "morphdict_data";

/// Name of the compiled dictionary directory inside [`DATA_DIR_NAME`].
const OUTPUT_DIR_NAME: &str = "data";

/// Name of the version stamp file inside [`DATA_DIR_NAME`].
pub const VERSION_FILE_NAME: &str = "version.txt";

/// Upstream location of the OpenCorpora dictionary export.
pub const DEFAULT_SOURCE_URL: &str =
    "http://opencorpora.org/files/export/dict/dict.opcorpora.xml.zip";

const ROOT_ENV_VAR: &str = "MORPHDICT_ROOT";
const SOURCE_URL_ENV_VAR: &str = "MORPHDICT_SOURCE_URL";

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// What the pipeline is allowed to do with the raw corpus file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildFlags {
    /// Fetch a fresh corpus even if one is already on disk.
    pub download: bool,
    /// Delete the corpus file after a successful compile.
    pub unlink: bool,
}

impl Default for RebuildFlags {
    fn default() -> Self {
        Self {
            download: true,
            unlink: true,
        }
    }
}

impl RebuildFlags {
    /// Derive the effective flags from the two CLI switches.
    ///
    /// Skipping the download also keeps the corpus: a reused file is the only
    /// copy the operator has, so it is never deleted.
    pub fn from_cli(skip_download: bool, skip_unlink: bool) -> Self {
        Self {
            download: !skip_download,
            unlink: !(skip_unlink || skip_download),
        }
    }
}

// ---------------------------------------------------------------------------
// RebuildConfig
// ---------------------------------------------------------------------------

/// Fixed paths, constants, and flags for one pipeline run.
#[derive(Debug, Clone)]
pub struct RebuildConfig {
    /// Where the raw corpus export is stored.
    pub corpus_path: PathBuf,
    /// The compiled dictionary directory.
    pub output_dir: PathBuf,
    /// Where the version stamp is persisted.
    pub version_file: PathBuf,
    /// On-disk schema version used as the stamp prefix.
    pub format_version: String,
    /// Upstream export to download.
    pub source_url: Url,
    /// Effective download/unlink flags.
    pub flags: RebuildFlags,
}

impl RebuildConfig {
    /// Build the default layout under `root`:
    ///
    /// ```text
    /// <root>/
    /// ├── dict.xml
    /// └── morphdict_data/
    ///     ├── data/
    ///     └── version.txt
    /// ```
    pub fn under_root(root: &Path, source_url: Url, flags: RebuildFlags) -> Self {
        let data_dir = root.join(DATA_DIR_NAME);
        Self {
            corpus_path: root.join(CORPUS_FILE_NAME),
            output_dir: data_dir.join(OUTPUT_DIR_NAME),
            version_file: data_dir.join(VERSION_FILE_NAME),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
            source_url,
            flags,
        }
    }

    /// Resolve and validate a config from optional overrides.
    ///
    /// `root` defaults to the current directory and `source_url` to
    /// [`DEFAULT_SOURCE_URL`].
    pub fn resolve(
        root: Option<PathBuf>,
        source_url: Option<String>,
        flags: RebuildFlags,
    ) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir()
                .map_err(|e| MorphDictError::io(".", e))?,
        };

        let raw_url = source_url.unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let url = Url::parse(&raw_url)
            .map_err(|e| MorphDictError::config(format!("invalid source URL '{raw_url}': {e}")))?;

        let config = Self::under_root(&root, url, flags);
        config.validate()?;

        tracing::debug!(
            corpus = %config.corpus_path.display(),
            output = %config.output_dir.display(),
            version_file = %config.version_file.display(),
            "resolved rebuild config"
        );

        Ok(config)
    }

    /// Check that the paths cannot clobber each other.
    ///
    /// The output directory is deleted wholesale on every rebuild, so neither
    /// the corpus nor the version file may live inside it.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.source_url.scheme(), "http" | "https") {
            return Err(MorphDictError::config(format!(
                "unsupported source URL scheme '{}': expected http or https",
                self.source_url.scheme()
            )));
        }
        if self.format_version.is_empty() {
            return Err(MorphDictError::config("format version must not be empty"));
        }
        if self.output_dir.file_name().is_none() {
            return Err(MorphDictError::config(format!(
                "output directory '{}' has no final component",
                self.output_dir.display()
            )));
        }
        if self.corpus_path.starts_with(&self.output_dir) {
            return Err(MorphDictError::config(
                "corpus path must not be inside the output directory",
            ));
        }
        if self.version_file.starts_with(&self.output_dir) {
            return Err(MorphDictError::config(
                "version file must not be inside the output directory",
            ));
        }
        Ok(())
    }

    /// Sibling directory the compiler writes into before it replaces `output_dir`.
    pub fn staging_dir(&self) -> PathBuf {
        let mut name = self
            .output_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".staging");
        self.output_dir.with_file_name(name)
    }
}

/// Root directory from `MORPHDICT_ROOT`, if set and non-empty.
pub fn root_from_env() -> Option<PathBuf> {
    match std::env::var(ROOT_ENV_VAR) {
        Ok(val) if !val.is_empty() => Some(PathBuf::from(val)),
        _ => None,
    }
}

/// Source URL from `MORPHDICT_SOURCE_URL`, if set and non-empty.
pub fn source_url_from_env() -> Option<String> {
    match std::env::var(SOURCE_URL_ENV_VAR) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}
