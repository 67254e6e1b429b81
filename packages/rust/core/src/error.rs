//! Stage-tagged errors for the rebuild pipeline.
//!
//! Collaborators report [`MorphDictError`]; the driver wraps it in the variant
//! for the stage that failed so operators can tell where a run stopped.

use std::path::PathBuf;

use morphdict_shared::MorphDictError;

/// Fatal pipeline failure. The run stops at the first one.
#[derive(Debug, thiserror::Error)]
pub enum RebuildError {
    /// The rebuild config failed validation before any stage ran.
    #[error("invalid rebuild configuration")]
    Config(#[source] MorphDictError),

    /// The corpus could not be downloaded.
    #[error("corpus acquisition failed")]
    Acquisition(#[source] MorphDictError),

    /// The compiler rejected the corpus or could not write its output.
    #[error("dictionary compilation failed")]
    Compilation(#[source] MorphDictError),

    /// The compiled dictionary could not be read or has no usable revision.
    #[error("version derivation failed")]
    VersionDerivation(#[source] MorphDictError),
}

impl RebuildError {
    /// The collaborator error underneath the stage tag.
    pub fn cause(&self) -> &MorphDictError {
        match self {
            Self::Config(e) | Self::Acquisition(e) | Self::Compilation(e) | Self::VersionDerivation(e) => e,
        }
    }
}

/// Removing the raw corpus failed. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
#[error("failed to remove raw corpus at {path:?}: {source}")]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_keeps_cause() {
        let err = RebuildError::Compilation(MorphDictError::parse("unexpected </lemma>"));
        assert_eq!(err.to_string(), "dictionary compilation failed");
        assert!(err.cause().to_string().contains("unexpected </lemma>"));

        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().starts_with("parse error"));
    }
}
