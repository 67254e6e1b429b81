//! End-to-end rebuild: acquire → compile → clean up → stamp version.

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use morphdict_shared::{DictMeta, RebuildConfig, VersionStamp};

use crate::acquire::{Acquisition, acquire_corpus};
use crate::cleanup::{CleanupOutcome, cleanup_corpus};
use crate::collaborators::{Compiler, Downloader, Loader};
use crate::error::RebuildError;
use crate::rebuild::rebuild_dictionary;
use crate::version::write_version;

/// Result of a successful rebuild.
#[derive(Debug)]
pub struct RebuildReport {
    /// How the corpus was obtained.
    pub acquisition: Acquisition,
    /// What happened to the raw corpus afterwards.
    pub cleanup: CleanupOutcome,
    /// Time spent acquiring, compiling and cleaning up.
    pub elapsed: Duration,
    /// Label written to the version file.
    pub stamp: VersionStamp,
    /// Metadata of the freshly compiled dictionary.
    pub meta: DictMeta,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &RebuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &RebuildReport) {}
}

/// Drives one rebuild with the given collaborators.
pub struct RebuildPipeline<D, C, L> {
    config: RebuildConfig,
    downloader: D,
    compiler: C,
    loader: L,
}

impl<D, C, L> RebuildPipeline<D, C, L>
where
    D: Downloader,
    C: Compiler,
    L: Loader,
{
    pub fn new(config: RebuildConfig, downloader: D, compiler: C, loader: L) -> Self {
        Self {
            config,
            downloader,
            compiler,
            loader,
        }
    }

    pub fn config(&self) -> &RebuildConfig {
        &self.config
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Run every stage in order, stopping at the first fatal error.
    ///
    /// Only a failed corpus removal is tolerated; it is reported in
    /// [`RebuildReport::cleanup`] and the version is still written.
    #[instrument(skip_all, fields(
        corpus = %self.config.corpus_path.display(),
        download = self.config.flags.download,
        unlink = self.config.flags.unlink,
    ))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RebuildReport, RebuildError> {
        let cfg = &self.config;
        cfg.validate().map_err(RebuildError::Config)?;

        let start = Instant::now();
        info!(source = %cfg.source_url, "starting dictionary rebuild");

        // --- Phase 1: Acquire ---
        progress.phase("Acquiring corpus");
        let acquisition = acquire_corpus(&self.downloader, &cfg.corpus_path, cfg.flags.download)
            .await
            .map_err(RebuildError::Acquisition)?;

        // --- Phase 2: Compile ---
        progress.phase("Compiling dictionary");
        rebuild_dictionary(
            &self.compiler,
            &cfg.corpus_path,
            &cfg.output_dir,
            &cfg.staging_dir(),
        )
        .map_err(RebuildError::Compilation)?;

        // --- Phase 3: Cleanup ---
        progress.phase("Cleaning up");
        let cleanup = cleanup_corpus(&cfg.corpus_path, cfg.flags.unlink);

        let elapsed = start.elapsed();

        // --- Phase 4: Version ---
        progress.phase("Writing version");
        let (stamp, meta) = write_version(
            &self.loader,
            &cfg.output_dir,
            &cfg.version_file,
            &cfg.format_version,
        )
        .map_err(RebuildError::VersionDerivation)?;

        let report = RebuildReport {
            acquisition,
            cleanup,
            elapsed,
            stamp,
            meta,
        };

        progress.done(&report);

        info!(
            version = %report.stamp,
            acquisition = ?report.acquisition,
            cleanup = ?report.cleanup,
            elapsed_ms = report.elapsed.as_millis(),
            "dictionary rebuild complete"
        );

        Ok(report)
    }
}
