//! Compiled dictionary directory writer.
//!
//! Creates the following layout:
//! ```text
//! <output_dir>/
//! ├── grammemes.json
//! ├── gramtab.json
//! ├── lexemes.jsonl
//! ├── link_types.json
//! ├── links.json
//! └── meta.json        (written last)
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use morphdict_shared::{CURRENT_FORMAT_VERSION, DictMeta, MorphDictError, Result, SOURCE_REVISION_KEY};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::parser::{CorpusHeader, Lexeme};

pub(crate) const META_FILE: &str = "meta.json";
pub(crate) const GRAMMEMES_FILE: &str = "grammemes.json";
pub(crate) const GRAMTAB_FILE: &str = "gramtab.json";
pub(crate) const LEXEMES_FILE: &str = "lexemes.jsonl";
pub(crate) const LINKS_FILE: &str = "links.json";
pub(crate) const LINK_TYPES_FILE: &str = "link_types.json";

/// Every file a complete compiled dictionary contains.
pub const REQUIRED_FILES: &[&str] = &[
    META_FILE,
    GRAMMEMES_FILE,
    GRAMTAB_FILE,
    LEXEMES_FILE,
    LINKS_FILE,
    LINK_TYPES_FILE,
];

/// Provenance recorded in `meta.json` alongside the corpus header.
#[derive(Debug, Clone)]
pub(crate) struct SourceInfo {
    pub source: String,
    pub sha256: String,
    pub compiled_at: String,
}

#[derive(Serialize)]
struct LexemeRecord<'a> {
    id: u64,
    forms: Vec<(&'a str, u32)>,
}

/// Streams lexemes to disk and interns their tags.
pub(crate) struct DictWriter {
    dir: PathBuf,
    lexemes_path: PathBuf,
    lexemes: BufWriter<File>,
    tag_index: HashMap<String, u32>,
    gramtab: Vec<String>,
    words_count: usize,
}

impl DictWriter {
    /// Create `dir` (and parents) and open the lexeme stream.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| MorphDictError::io(dir, e))?;

        let lexemes_path = dir.join(LEXEMES_FILE);
        let file = File::create(&lexemes_path).map_err(|e| MorphDictError::io(&lexemes_path, e))?;

        debug!(path = %dir.display(), "output directory created");
        Ok(Self {
            dir: dir.to_path_buf(),
            lexemes_path,
            lexemes: BufWriter::new(file),
            tag_index: HashMap::new(),
            gramtab: Vec::new(),
            words_count: 0,
        })
    }

    /// Append one lexeme as a JSON line.
    pub fn push_lexeme(&mut self, lexeme: &Lexeme) -> Result<()> {
        let mut forms = Vec::with_capacity(lexeme.forms.len());
        for form in &lexeme.forms {
            let tag = lexeme.tag_for(form);
            let idx = self.intern_tag(tag);
            forms.push((form.word.as_str(), idx));
        }
        self.words_count += forms.len();

        let record = LexemeRecord {
            id: lexeme.id,
            forms,
        };
        serde_json::to_writer(&mut self.lexemes, &record).map_err(|e| {
            MorphDictError::io(&self.lexemes_path, std::io::Error::other(e))
        })?;
        self.lexemes
            .write_all(b"\n")
            .map_err(|e| MorphDictError::io(&self.lexemes_path, e))
    }

    fn intern_tag(&mut self, tag: String) -> u32 {
        if let Some(&idx) = self.tag_index.get(&tag) {
            return idx;
        }
        let idx = self.gramtab.len() as u32;
        self.gramtab.push(tag.clone());
        self.tag_index.insert(tag, idx);
        idx
    }

    /// Write the remaining tables, then `meta.json`, and return the metadata.
    #[instrument(skip_all, fields(path = %self.dir.display()))]
    pub fn finish(mut self, header: &CorpusHeader, source: &SourceInfo) -> Result<DictMeta> {
        self.lexemes
            .flush()
            .map_err(|e| MorphDictError::io(&self.lexemes_path, e))?;

        let grammemes: Vec<[&str; 4]> = header
            .grammemes
            .iter()
            .map(|g| [g.name.as_str(), g.parent.as_str(), g.alias.as_str(), g.description.as_str()])
            .collect();
        write_json(&self.dir.join(GRAMMEMES_FILE), &grammemes)?;
        write_json(&self.dir.join(GRAMTAB_FILE), &self.gramtab)?;

        let links: Vec<[u64; 3]> = header
            .links
            .iter()
            .map(|l| [l.from, l.to, u64::from(l.link_type)])
            .collect();
        write_json(&self.dir.join(LINKS_FILE), &links)?;
        write_json(&self.dir.join(LINK_TYPES_FILE), &header.link_types)?;

        let meta = self.build_meta(header, source);
        write_json_atomic(&self.dir.join(META_FILE), &meta)?;

        info!(
            lexemes = header.lexeme_count,
            words = self.words_count,
            gramtab = self.gramtab.len(),
            "compiled dictionary written"
        );
        Ok(meta)
    }

    fn build_meta(&self, header: &CorpusHeader, source: &SourceInfo) -> DictMeta {
        let mut meta = DictMeta::new();
        meta.insert("format_version", CURRENT_FORMAT_VERSION);
        meta.insert("compiler_version", env!("CARGO_PKG_VERSION"));
        meta.insert("compiled_at", source.compiled_at.as_str());
        meta.insert("source", source.source.as_str());
        meta.insert("source_sha256", source.sha256.as_str());
        if let Some(version) = &header.version {
            meta.insert("source_version", version.as_str());
        }
        if let Some(revision) = &header.revision {
            meta.insert(SOURCE_REVISION_KEY, revision.as_str());
        }
        meta.insert("source_lexemes_count", header.lexeme_count);
        meta.insert("source_links_count", header.links.len());
        meta.insert("grammemes_count", header.grammemes.len());
        meta.insert("gramtab_length", self.gramtab.len());
        meta.insert("words_count", self.words_count);
        meta
    }
}

/// Write a JSON file (pretty-printed).
fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(|e| {
        MorphDictError::validation(format!("JSON serialization failed: {e}"))
    })?;
    std::fs::write(path, json).map_err(|e| MorphDictError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Write a JSON file via a temp sibling and rename, so it is never seen half-written.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));
    write_json(&temp, data)?;
    std::fs::rename(&temp, path).map_err(|e| MorphDictError::io(path, e))
}
