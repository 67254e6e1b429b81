//! Opening compiled dictionary directories.

use std::path::Path;

use morphdict_shared::{CURRENT_FORMAT_VERSION, DictMeta, MorphDictError, Result};
use tracing::{debug, instrument};

use crate::writer::{META_FILE, REQUIRED_FILES};

/// Reads and validates compiled dictionaries.
#[derive(Debug, Clone)]
pub struct DictLoader {
    expected_format_version: String,
}

impl Default for DictLoader {
    fn default() -> Self {
        Self {
            expected_format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

impl DictLoader {
    /// Loader that accepts only `format_version`.
    pub fn expecting(format_version: impl Into<String>) -> Self {
        Self {
            expected_format_version: format_version.into(),
        }
    }

    /// Open the dictionary at `dir` and return its metadata.
    ///
    /// Fails with an I/O (not found) error if `dir` does not exist, and with a
    /// validation error if any required file is missing, `meta.json` does not
    /// parse, or the format version differs from the expected one.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load_meta(&self, dir: &Path) -> Result<DictMeta> {
        let stat = std::fs::metadata(dir).map_err(|e| MorphDictError::io(dir, e))?;
        if !stat.is_dir() {
            return Err(MorphDictError::validation(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        for name in REQUIRED_FILES {
            if !dir.join(name).is_file() {
                return Err(MorphDictError::validation(format!(
                    "compiled dictionary at {} is missing {name}",
                    dir.display()
                )));
            }
        }

        let meta_path = dir.join(META_FILE);
        let content =
            std::fs::read_to_string(&meta_path).map_err(|e| MorphDictError::io(&meta_path, e))?;
        let meta: DictMeta = serde_json::from_str(&content)
            .map_err(|e| MorphDictError::validation(format!("invalid {META_FILE}: {e}")))?;

        match meta.get_scalar("format_version") {
            Some(found) if found == self.expected_format_version => {}
            found => {
                return Err(MorphDictError::validation(format!(
                    "unsupported format_version: {} (expected {})",
                    found.as_deref().unwrap_or("<missing>"),
                    self.expected_format_version
                )));
            }
        }

        debug!(entries = meta.len(), "metadata loaded");
        Ok(meta)
    }
}
