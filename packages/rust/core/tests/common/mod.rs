//! In-memory collaborators for driving the pipeline without network or XML.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use morphdict_core::{Compiler, Downloader, Loader};
use morphdict_shared::{DictMeta, MorphDictError, RebuildConfig, RebuildFlags, Result};
use url::Url;

/// Writes a fixed body to the destination, or fails.
pub struct FakeDownloader {
    pub body: String,
    pub fail: bool,
    calls: AtomicUsize,
}

impl FakeDownloader {
    pub fn serving(body: &str) -> Self {
        Self {
            body: body.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::serving("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Downloader for FakeDownloader {
    async fn fetch(&self, destination: &Path, _force_overwrite: bool) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MorphDictError::Network("HTTP 503 Service Unavailable".into()));
        }
        std::fs::write(destination, &self.body).map_err(|e| MorphDictError::io(destination, e))
    }
}

/// Produces `meta.json` plus a copy of the corpus.
pub struct FakeCompiler {
    pub revision: Option<String>,
    pub fail: bool,
    /// Delete the corpus while compiling so the cleanup stage has nothing to remove.
    pub consume_corpus: bool,
    calls: AtomicUsize,
}

impl FakeCompiler {
    pub fn with_revision(revision: &str) -> Self {
        Self {
            revision: Some(revision.to_string()),
            fail: false,
            consume_corpus: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn without_revision() -> Self {
        Self {
            revision: None,
            ..Self::with_revision("")
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_revision("1234")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Compiler for FakeCompiler {
    fn compile(&self, corpus_path: &Path, output_dir: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let corpus =
            std::fs::read_to_string(corpus_path).map_err(|e| MorphDictError::io(corpus_path, e))?;
        if self.fail {
            return Err(MorphDictError::parse("unexpected end of document"));
        }

        std::fs::create_dir_all(output_dir).map_err(|e| MorphDictError::io(output_dir, e))?;
        std::fs::write(output_dir.join("corpus.copy"), corpus)
            .map_err(|e| MorphDictError::io(output_dir, e))?;

        let mut meta = DictMeta::new();
        meta.insert("format_version", "1");
        if let Some(rev) = &self.revision {
            meta.insert("source_revision", rev.as_str());
        }
        let json = serde_json::to_string(&meta).map_err(|e| MorphDictError::parse(e.to_string()))?;
        std::fs::write(output_dir.join("meta.json"), json)
            .map_err(|e| MorphDictError::io(output_dir, e))?;

        if self.consume_corpus {
            std::fs::remove_file(corpus_path).map_err(|e| MorphDictError::io(corpus_path, e))?;
        }
        Ok(())
    }
}

/// Reads back whatever `FakeCompiler` wrote.
pub struct FakeLoader;

impl Loader for FakeLoader {
    fn open(&self, output_dir: &Path) -> Result<DictMeta> {
        let path = output_dir.join("meta.json");
        let raw = std::fs::read_to_string(&path).map_err(|e| MorphDictError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| MorphDictError::validation(e.to_string()))
    }
}

/// Default layout under `root` with a dummy upstream URL.
pub fn config(root: &Path, flags: RebuildFlags) -> RebuildConfig {
    let url = Url::parse("http://127.0.0.1:9/dict.xml").unwrap();
    RebuildConfig::under_root(root, url, flags)
}
