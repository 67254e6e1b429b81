//! OpenCorpora dictionary compiler and compiled-dictionary loader.
//!
//! [`OpenCorporaCompiler`] turns a raw `dict.xml` export into a compiled
//! directory of JSON tables plus `meta.json`. [`DictLoader`] opens such a
//! directory and hands back its metadata.

mod loader;
mod parser;
mod writer;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::Utc;
use morphdict_shared::{DictMeta, MorphDictError, Result};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

pub use loader::DictLoader;
pub use parser::{CorpusHeader, Grammeme, Lexeme, Link, WordForm, parse_corpus};
pub use writer::REQUIRED_FILES;

use writer::{DictWriter, SourceInfo};

/// Name recorded as `source` in the compiled metadata.
const SOURCE_NAME: &str = "opencorpora.org";

/// Compiles OpenCorpora XML exports.
#[derive(Debug, Clone, Default)]
pub struct OpenCorporaCompiler;

impl OpenCorporaCompiler {
    /// Compile `corpus_path` into `output_dir`.
    ///
    /// `output_dir` should not exist or be empty. On error it may be left
    /// partially written; callers that care compile into a scratch directory.
    #[instrument(skip_all, fields(corpus = %corpus_path.display(), output = %output_dir.display()))]
    pub fn compile(&self, corpus_path: &Path, output_dir: &Path) -> Result<DictMeta> {
        let file = File::open(corpus_path).map_err(|e| MorphDictError::io(corpus_path, e))?;
        let mut source = BufReader::new(HashingReader::new(file));

        let mut writer = DictWriter::create(output_dir)?;
        let header = parse_corpus(&mut source, |lexeme| writer.push_lexeme(&lexeme))?;

        // Anything after the closing root tag still counts towards the checksum.
        std::io::copy(&mut source, &mut std::io::sink())
            .map_err(|e| MorphDictError::io(corpus_path, e))?;
        let sha256 = source.into_inner().finalize_hex();

        info!(
            revision = header.revision.as_deref().unwrap_or("<none>"),
            lexemes = header.lexeme_count,
            "corpus parsed"
        );

        let info = SourceInfo {
            source: SOURCE_NAME.to_string(),
            sha256,
            compiled_at: Utc::now().to_rfc3339(),
        };
        writer.finish(&header, &info)
    }
}

/// Reader adapter that hashes every byte passing through it.
struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    fn finalize_hex(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
