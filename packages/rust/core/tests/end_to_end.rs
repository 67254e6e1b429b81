//! Full rebuild against a mock upstream serving the zipped sample export.

use std::io::{Cursor, Write};

use morphdict_compiler::{DictLoader, OpenCorporaCompiler, REQUIRED_FILES};
use morphdict_core::{Acquisition, CleanupOutcome, RebuildPipeline, SilentProgress};
use morphdict_fetch::{DownloadOptions, HttpDownloader};
use morphdict_shared::{RebuildConfig, RebuildFlags};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SAMPLE: &str = "../../../fixtures/opencorpora/dict.sample.xml";

fn zipped_sample() -> Vec<u8> {
    let body = std::fs::read(SAMPLE).unwrap();
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("dict.opcorpora.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(&body).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn rebuilds_from_zipped_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/export/dict/dict.opcorpora.xml.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zipped_sample()))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!(
        "{}/files/export/dict/dict.opcorpora.xml.zip",
        server.uri()
    ))
    .unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let config = RebuildConfig::under_root(tmp.path(), url.clone(), RebuildFlags::default());
    let corpus = config.corpus_path.clone();
    let output = config.output_dir.clone();
    let version_file = config.version_file.clone();

    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("words.dawg"), "left over from an older layout").unwrap();

    let downloader = HttpDownloader::new(&DownloadOptions::new(url)).unwrap();
    let pipeline =
        RebuildPipeline::new(config, downloader, OpenCorporaCompiler, DictLoader::default());
    let report = pipeline.run(&SilentProgress).await.unwrap();

    assert_eq!(report.acquisition, Acquisition::Downloaded);
    assert_eq!(report.cleanup, CleanupOutcome::Removed);
    assert_eq!(report.stamp.to_string(), "1.417127");
    assert_eq!(std::fs::read_to_string(&version_file).unwrap(), "1.417127");
    assert_eq!(report.meta.get_scalar("words_count").as_deref(), Some("10"));

    assert!(!corpus.exists());
    assert!(!output.join("words.dawg").exists());
    for name in REQUIRED_FILES {
        assert!(output.join(name).is_file(), "missing {name}");
    }
}

#[tokio::test]
async fn reuses_local_export_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/dict.xml", server.uri())).unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let flags = RebuildFlags::from_cli(true, false);
    let config = RebuildConfig::under_root(tmp.path(), url.clone(), flags);
    std::fs::copy(SAMPLE, &config.corpus_path).unwrap();
    let corpus = config.corpus_path.clone();

    let downloader = HttpDownloader::new(&DownloadOptions::new(url)).unwrap();
    let pipeline =
        RebuildPipeline::new(config, downloader, OpenCorporaCompiler, DictLoader::default());
    let report = pipeline.run(&SilentProgress).await.unwrap();

    assert_eq!(report.acquisition, Acquisition::Reused);
    assert_eq!(report.cleanup, CleanupOutcome::Kept);
    assert_eq!(report.stamp.to_string(), "1.417127");
    assert!(corpus.is_file());
}
