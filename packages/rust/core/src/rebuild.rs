//! Rebuild stage: replace the compiled dictionary with a fresh one.
//!
//! The compiler writes into a sibling staging directory. Only when it
//! succeeds is the previous output removed and the staging directory renamed
//! into place, so a failed compile leaves the old dictionary untouched. The
//! remove-then-rename step itself is not atomic, and two runs sharing the same
//! paths will race.

use std::path::Path;

use morphdict_shared::{MorphDictError, Result};
use tracing::{debug, info, instrument, warn};

use crate::collaborators::Compiler;

/// Compile `corpus_path` and swap the result into `output_dir`.
#[instrument(skip_all, fields(corpus = %corpus_path.display(), output = %output_dir.display()))]
pub fn rebuild_dictionary<C: Compiler>(
    compiler: &C,
    corpus_path: &Path,
    output_dir: &Path,
    staging_dir: &Path,
) -> Result<()> {
    if !corpus_path.is_file() {
        return Err(MorphDictError::validation(format!(
            "raw corpus {} is missing",
            corpus_path.display()
        )));
    }

    if remove_dir_if_exists(staging_dir)? {
        warn!(path = %staging_dir.display(), "removed leftover staging directory");
    }
    if let Some(parent) = staging_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MorphDictError::io(parent, e))?;
    }

    info!(staging = %staging_dir.display(), "compiling dictionary");
    if let Err(e) = compiler.compile(corpus_path, staging_dir) {
        if let Err(cleanup) = remove_dir_if_exists(staging_dir) {
            warn!(error = %cleanup, "failed to remove staging directory after compile error");
        }
        return Err(e);
    }

    if remove_dir_if_exists(output_dir)? {
        debug!("previous compiled dictionary removed");
    }
    std::fs::rename(staging_dir, output_dir).map_err(|e| MorphDictError::io(output_dir, e))?;

    info!("compiled dictionary in place");
    Ok(())
}

/// Recursively delete `path`. Returns whether anything was there.
fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MorphDictError::io(path, e)),
    }
}
