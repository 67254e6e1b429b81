use std::path::Path;

use morphdict_compiler::{DictLoader, OpenCorporaCompiler, REQUIRED_FILES};
use sha2::{Digest, Sha256};

const SAMPLE: &str = "../../../fixtures/opencorpora/dict.sample.xml";

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("parse json")
}

#[test]
fn compiles_sample_export() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("data");

    let meta = OpenCorporaCompiler.compile(Path::new(SAMPLE), &out).unwrap();

    for name in REQUIRED_FILES {
        assert!(out.join(name).is_file(), "missing {name}");
    }

    assert_eq!(meta.get_scalar("source_revision").as_deref(), Some("417127"));
    assert_eq!(meta.get_scalar("source_version").as_deref(), Some("0.92"));
    assert_eq!(meta.get_scalar("source").as_deref(), Some("opencorpora.org"));
    assert_eq!(meta.get_scalar("source_lexemes_count").as_deref(), Some("4"));
    assert_eq!(meta.get_scalar("source_links_count").as_deref(), Some("1"));
    assert_eq!(meta.get_scalar("grammemes_count").as_deref(), Some("16"));
    assert_eq!(meta.get_scalar("gramtab_length").as_deref(), Some("6"));
    assert_eq!(meta.get_scalar("words_count").as_deref(), Some("10"));

    let raw = std::fs::read(SAMPLE).unwrap();
    let expected_sha = format!("{:x}", Sha256::digest(&raw));
    assert_eq!(meta.get_scalar("source_sha256"), Some(expected_sha));

    // What the loader reads back is exactly what the compiler returned.
    let loaded = DictLoader::default().load_meta(&out).unwrap();
    assert_eq!(loaded, meta);
}

#[test]
fn writes_lexemes_and_tables() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("data");
    OpenCorporaCompiler.compile(Path::new(SAMPLE), &out).unwrap();

    let gramtab = read_json(&out.join("gramtab.json"));
    let tags: Vec<&str> = gramtab
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(tags[0], "NOUN,anim,masc sing,nomn");
    assert!(tags.contains(&"INFN,intr"));
    assert!(tags.contains(&"VERB,intr sing"));

    let lexemes = std::fs::read_to_string(out.join("lexemes.jsonl")).unwrap();
    let lines: Vec<serde_json::Value> = lexemes
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[1]["forms"][0][0], "кот");
    // "кот" and "ёж" share the same four tags
    assert_eq!(lines[0]["forms"][1][1], lines[1]["forms"][1][1]);

    let grammemes = read_json(&out.join("grammemes.json"));
    assert_eq!(grammemes[1][0], "NOUN");
    assert_eq!(grammemes[1][1], "POST");

    let links = read_json(&out.join("links.json"));
    assert_eq!(links, serde_json::json!([[3, 4, 3]]));

    let link_types = read_json(&out.join("link_types.json"));
    assert_eq!(link_types["3"], "INFN-VERB");

    assert!(!out.join(".meta.json.tmp").exists());
}

#[test]
fn malformed_export_fails_to_compile() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("dict.xml");
    std::fs::write(&corpus, "<dictionary revision=\"1\"><lemmata><lemma id=\"1\">").unwrap();

    let out = tmp.path().join("data");
    let err = OpenCorporaCompiler.compile(&corpus, &out).unwrap_err();
    assert!(matches!(err, morphdict_shared::MorphDictError::Parse { .. }));
    assert!(!out.join("meta.json").exists());
}

#[test]
fn missing_corpus_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = OpenCorporaCompiler
        .compile(&tmp.path().join("dict.xml"), &tmp.path().join("data"))
        .unwrap_err();
    assert!(err.is_not_found());
}
