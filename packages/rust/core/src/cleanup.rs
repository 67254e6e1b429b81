//! Cleanup stage: drop the raw corpus once it has been compiled.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::CleanupError;

/// What happened to the raw corpus after the rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The file was deleted.
    Removed,
    /// Deletion was not requested.
    Kept,
    /// Deletion was requested and failed; the run carried on.
    Failed(String),
}

/// Delete the corpus file.
pub fn remove_corpus(corpus_path: &Path) -> Result<(), CleanupError> {
    std::fs::remove_file(corpus_path).map_err(|source| CleanupError {
        path: corpus_path.to_path_buf(),
        source,
    })
}

/// Delete the corpus if `unlink` is set. Failures are downgraded to warnings.
pub fn cleanup_corpus(corpus_path: &Path, unlink: bool) -> CleanupOutcome {
    if !unlink {
        debug!(corpus = %corpus_path.display(), "keeping raw corpus");
        return CleanupOutcome::Kept;
    }

    match remove_corpus(corpus_path) {
        Ok(()) => {
            info!(corpus = %corpus_path.display(), "raw corpus removed");
            CleanupOutcome::Removed
        }
        Err(e) => {
            warn!(error = %e, "raw corpus cleanup failed; compiled dictionary is unaffected");
            CleanupOutcome::Failed(e.to_string())
        }
    }
}
