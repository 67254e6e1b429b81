//! Streaming parser for the OpenCorpora dictionary XML export.
//!
//! The export is large, so lemmas are handed to a callback one at a time
//! instead of being collected. Everything else (grammemes, links) is small
//! and returned in [`CorpusHeader`].

use std::collections::BTreeMap;
use std::io::BufRead;

use morphdict_shared::{MorphDictError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// A grammeme declaration from `<grammemes>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammeme {
    pub name: String,
    pub parent: String,
    pub alias: String,
    pub description: String,
}

/// One inflected form of a lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordForm {
    /// Lower-cased surface form.
    pub word: String,
    /// Grammemes specific to this form.
    pub grammemes: Vec<String>,
}

/// A `<lemma>` entry with its forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub id: u64,
    /// Lower-cased dictionary form.
    pub lemma: String,
    /// Grammemes shared by all forms (part of speech, gender, ...).
    pub lemma_grammemes: Vec<String>,
    pub forms: Vec<WordForm>,
}

impl Lexeme {
    /// Tag string for one form: `"NOUN,anim,masc sing,nomn"`.
    pub fn tag_for(&self, form: &WordForm) -> String {
        let lemma_part = self.lemma_grammemes.join(",");
        let form_part = form.grammemes.join(",");
        match (lemma_part.is_empty(), form_part.is_empty()) {
            (_, true) => lemma_part,
            (true, false) => form_part,
            (false, false) => format!("{lemma_part} {form_part}"),
        }
    }
}

/// A `<link>` between two lemmas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub from: u64,
    pub to: u64,
    pub link_type: u32,
}

/// Everything in the export except the lemmas.
#[derive(Debug, Clone, Default)]
pub struct CorpusHeader {
    /// `version` attribute of `<dictionary>`.
    pub version: Option<String>,
    /// `revision` attribute of `<dictionary>`.
    pub revision: Option<String>,
    pub grammemes: Vec<Grammeme>,
    pub link_types: BTreeMap<u32, String>,
    pub links: Vec<Link>,
    /// Number of lemmas passed to the callback.
    pub lexeme_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Grammemes,
    Lemmata,
    LinkTypes,
    Links,
}

#[derive(Debug, Clone, Copy)]
enum TextTarget {
    GrammemeName,
    GrammemeAlias,
    GrammemeDescription,
    LinkType(u32),
}

/// Parse an export, calling `on_lexeme` for every lemma in document order.
pub fn parse_corpus<R, F>(source: R, mut on_lexeme: F) -> Result<CorpusHeader>
where
    R: BufRead,
    F: FnMut(Lexeme) -> Result<()>,
{
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut header = CorpusHeader::default();
    let mut seen_root = false;
    let mut closed_root = false;
    let mut section = Section::Outside;
    let mut grammeme: Option<Grammeme> = None;
    let mut lexeme: Option<Lexeme> = None;
    let mut form: Option<WordForm> = None;
    let mut in_lemma_form = false;
    let mut text_target: Option<TextTarget> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            MorphDictError::parse(format!(
                "malformed XML at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.name().as_ref() {
                    b"dictionary" => {
                        seen_root = true;
                        closed_root = is_empty;
                        header.version = attr(e, b"version")?;
                        header.revision = attr(e, b"revision")?;
                    }
                    b"grammemes" if !is_empty => section = Section::Grammemes,
                    b"lemmata" if !is_empty => section = Section::Lemmata,
                    b"link_types" if !is_empty => section = Section::LinkTypes,
                    b"links" if !is_empty => section = Section::Links,

                    b"grammeme" if section == Section::Grammemes => {
                        let parent = attr(e, b"parent")?.unwrap_or_default();
                        let g = Grammeme {
                            parent,
                            ..Grammeme::default()
                        };
                        if is_empty {
                            header.grammemes.push(g);
                        } else {
                            grammeme = Some(g);
                        }
                    }
                    b"name" if grammeme.is_some() => text_target = Some(TextTarget::GrammemeName),
                    b"alias" if grammeme.is_some() => text_target = Some(TextTarget::GrammemeAlias),
                    b"description" if grammeme.is_some() => {
                        text_target = Some(TextTarget::GrammemeDescription)
                    }

                    b"lemma" if section == Section::Lemmata => {
                        let id = required_num::<u64>(e, b"id", "lemma")?;
                        let lex = Lexeme {
                            id,
                            lemma: String::new(),
                            lemma_grammemes: Vec::new(),
                            forms: Vec::new(),
                        };
                        if is_empty {
                            return Err(MorphDictError::parse(format!("lemma {id} has no <l> element")));
                        }
                        lexeme = Some(lex);
                    }
                    b"l" => {
                        let lex = lexeme.as_mut().ok_or_else(|| {
                            MorphDictError::parse("<l> element outside of <lemma>")
                        })?;
                        lex.lemma = attr(e, b"t")?.unwrap_or_default().to_lowercase();
                        in_lemma_form = !is_empty;
                    }
                    b"f" => {
                        if lexeme.is_none() {
                            return Err(MorphDictError::parse("<f> element outside of <lemma>"));
                        }
                        let word_form = WordForm {
                            word: attr(e, b"t")?.unwrap_or_default().to_lowercase(),
                            grammemes: Vec::new(),
                        };
                        if is_empty {
                            push_form(&mut lexeme, word_form);
                        } else {
                            form = Some(word_form);
                        }
                    }
                    b"g" => {
                        let value = attr(e, b"v")?.unwrap_or_default();
                        if let Some(f) = form.as_mut() {
                            f.grammemes.push(value);
                        } else if in_lemma_form {
                            if let Some(lex) = lexeme.as_mut() {
                                lex.lemma_grammemes.push(value);
                            }
                        }
                    }

                    b"type" if section == Section::LinkTypes => {
                        let id = required_num::<u32>(e, b"id", "link type")?;
                        if is_empty {
                            header.link_types.insert(id, String::new());
                        } else {
                            text_target = Some(TextTarget::LinkType(id));
                        }
                    }
                    b"link" if section == Section::Links => {
                        header.links.push(Link {
                            from: required_num(e, b"from", "link")?,
                            to: required_num(e, b"to", "link")?,
                            link_type: required_num(e, b"type", "link")?,
                        });
                    }
                    _ => {}
                }
            }

            Event::Text(ref t) => {
                if let Some(target) = text_target {
                    let text = t
                        .unescape()
                        .map_err(|e| MorphDictError::parse(format!("bad text content: {e}")))?
                        .into_owned();
                    match target {
                        TextTarget::GrammemeName => {
                            if let Some(g) = grammeme.as_mut() {
                                g.name = text;
                            }
                        }
                        TextTarget::GrammemeAlias => {
                            if let Some(g) = grammeme.as_mut() {
                                g.alias = text;
                            }
                        }
                        TextTarget::GrammemeDescription => {
                            if let Some(g) = grammeme.as_mut() {
                                g.description = text;
                            }
                        }
                        TextTarget::LinkType(id) => {
                            header.link_types.insert(id, text);
                        }
                    }
                }
            }

            Event::End(ref e) => match e.name().as_ref() {
                b"dictionary" => closed_root = true,
                b"grammemes" | b"lemmata" | b"link_types" | b"links" => section = Section::Outside,
                b"grammeme" => {
                    if let Some(g) = grammeme.take() {
                        header.grammemes.push(g);
                    }
                }
                b"name" | b"alias" | b"description" => text_target = None,
                b"type" => {
                    if let Some(TextTarget::LinkType(id)) = text_target.take() {
                        header.link_types.entry(id).or_default();
                    }
                }
                b"l" => in_lemma_form = false,
                b"f" => {
                    if let Some(f) = form.take() {
                        push_form(&mut lexeme, f);
                    }
                }
                b"lemma" => {
                    if let Some(lex) = lexeme.take() {
                        if lex.lemma.is_empty() {
                            return Err(MorphDictError::parse(format!(
                                "lemma {} has no <l> element",
                                lex.id
                            )));
                        }
                        header.lexeme_count += 1;
                        on_lexeme(lex)?;
                    }
                }
                _ => {}
            },

            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(MorphDictError::parse("missing <dictionary> root element"));
    }
    if !closed_root {
        return Err(MorphDictError::parse(
            "unexpected end of document: <dictionary> is not closed (truncated export?)",
        ));
    }

    Ok(header)
}

fn push_form(lexeme: &mut Option<Lexeme>, form: WordForm) {
    if let Some(lex) = lexeme.as_mut() {
        lex.forms.push(form);
    }
}

/// Read and unescape an attribute value.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a.map_err(|err| MorphDictError::parse(format!("bad attribute: {err}")))?;
        if a.key.as_ref() == key {
            let value = a
                .unescape_value()
                .map_err(|err| MorphDictError::parse(format!("bad attribute value: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Read a numeric attribute that must be present.
fn required_num<T: std::str::FromStr>(e: &BytesStart<'_>, key: &[u8], what: &str) -> Result<T> {
    let name = String::from_utf8_lossy(key);
    let raw = attr(e, key)?
        .ok_or_else(|| MorphDictError::parse(format!("{what} without '{name}' attribute")))?;
    raw.trim()
        .parse()
        .map_err(|_| MorphDictError::parse(format!("{what} has non-numeric '{name}': {raw:?}")))
}
