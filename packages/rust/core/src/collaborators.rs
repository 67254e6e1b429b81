//! Capabilities the pipeline delegates to.
//!
//! The driver is generic over these so tests can swap in fakes; the real
//! implementations come from `morphdict-fetch` and `morphdict-compiler`.

use std::future::Future;
use std::path::Path;

use morphdict_compiler::{DictLoader, OpenCorporaCompiler};
use morphdict_fetch::HttpDownloader;
use morphdict_shared::{DictMeta, Result};

/// Fetches the raw corpus export.
pub trait Downloader {
    /// Write the export to `destination`, replacing it when `force_overwrite` is set.
    fn fetch(&self, destination: &Path, force_overwrite: bool) -> impl Future<Output = Result<()>>;
}

/// Turns a raw corpus into a compiled dictionary directory.
pub trait Compiler {
    /// Populate `output_dir`, which must not exist or be empty.
    fn compile(&self, corpus_path: &Path, output_dir: &Path) -> Result<()>;
}

/// Reads metadata back out of a compiled dictionary.
pub trait Loader {
    fn open(&self, output_dir: &Path) -> Result<DictMeta>;
}

impl Downloader for HttpDownloader {
    async fn fetch(&self, destination: &Path, force_overwrite: bool) -> Result<()> {
        self.download_to(destination, force_overwrite).await.map(|_| ())
    }
}

impl Compiler for OpenCorporaCompiler {
    fn compile(&self, corpus_path: &Path, output_dir: &Path) -> Result<()> {
        OpenCorporaCompiler::compile(self, corpus_path, output_dir).map(|_| ())
    }
}

impl Loader for DictLoader {
    fn open(&self, output_dir: &Path) -> Result<DictMeta> {
        self.load_meta(output_dir)
    }
}
