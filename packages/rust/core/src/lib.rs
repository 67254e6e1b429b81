//! Rebuild orchestration for morphdict.
//!
//! This crate sequences corpus acquisition, dictionary compilation, raw corpus
//! cleanup and version stamping into a single [`RebuildPipeline::run`]. The
//! heavy lifting is delegated to the [`collaborators`] traits.

pub mod acquire;
pub mod cleanup;
pub mod collaborators;
pub mod error;
pub mod pipeline;
pub mod rebuild;
pub mod version;

pub use acquire::{Acquisition, acquire_corpus};
pub use cleanup::{CleanupOutcome, cleanup_corpus, remove_corpus};
pub use collaborators::{Compiler, Downloader, Loader};
pub use error::{CleanupError, RebuildError};
pub use pipeline::{ProgressReporter, RebuildPipeline, RebuildReport, SilentProgress};
pub use rebuild::rebuild_dictionary;
pub use version::write_version;
