//! Corpus export downloader.
//!
//! Streams the upstream OpenCorpora export to disk. Zipped exports are
//! unpacked on a blocking thread. The destination only ever appears complete:
//! bytes go to a `.part` sibling that is renamed into place at the end.

mod archive;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use morphdict_shared::{MorphDictError, Result};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Maximum number of redirects to follow (opencorpora.org redirects to its mirror).
const MAX_REDIRECTS: usize = 5;

/// Default whole-request timeout. The full export is a few hundred megabytes.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// User-Agent string for download requests.
const USER_AGENT: &str = concat!("morphdict/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options & progress
// ---------------------------------------------------------------------------

/// Configuration for the HTTP downloader.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Export location.
    pub url: Url,
    /// Timeout for the whole request in seconds.
    pub timeout_secs: u64,
}

impl DownloadOptions {
    /// Options for `url` with the default timeout.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Receives byte counts while a download is in flight.
pub trait DownloadProgress: Send + Sync {
    /// Called once the response headers arrive.
    fn started(&self, total_bytes: Option<u64>);
    /// Called after every chunk with the running total.
    fn advanced(&self, downloaded_bytes: u64);
    /// Called after the destination file is in place.
    fn finished(&self, downloaded_bytes: u64);
}

/// What [`HttpDownloader::download_to`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The destination existed and overwrite was not forced.
    Skipped,
    /// A fresh file was written.
    Downloaded {
        /// Bytes received over the wire.
        received_bytes: u64,
        /// Size of the file now at the destination.
        written_bytes: u64,
    },
}

// ---------------------------------------------------------------------------
// HttpDownloader
// ---------------------------------------------------------------------------

/// Downloads the corpus export over HTTP(S).
pub struct HttpDownloader {
    client: Client,
    url: Url,
    progress: Option<Arc<dyn DownloadProgress>>,
}

impl HttpDownloader {
    /// Build a downloader with its own HTTP client.
    pub fn new(opts: &DownloadOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| MorphDictError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: opts.url.clone(),
            progress: None,
        })
    }

    /// Attach a progress sink.
    pub fn with_progress(mut self, progress: Arc<dyn DownloadProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The export URL this downloader fetches.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the export into `destination`.
    ///
    /// With `force_overwrite` unset an existing destination is left alone.
    /// On failure nothing is left behind at `destination` or in temp files; an
    /// existing destination is only replaced once the new file is complete.
    #[instrument(skip_all, fields(url = %self.url, destination = %destination.display()))]
    pub async fn download_to(
        &self,
        destination: &Path,
        force_overwrite: bool,
    ) -> Result<DownloadOutcome> {
        if !force_overwrite && destination.exists() {
            info!("corpus already present, skipping download");
            return Ok(DownloadOutcome::Skipped);
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MorphDictError::io(parent, e))?;
        }

        let part_path = sibling_with_suffix(destination, ".part");
        let result = if is_zip(&self.url) {
            let zip_path = sibling_with_suffix(destination, ".zip.part");
            let result = self.fetch_zipped(&zip_path, &part_path).await;
            remove_quietly(&zip_path).await;
            result
        } else {
            self.stream_body(&part_path).await.map(|n| (n, n))
        };

        let (received_bytes, written_bytes) = match result {
            Ok(sizes) => sizes,
            Err(e) => {
                remove_quietly(&part_path).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&part_path, destination).await {
            remove_quietly(&part_path).await;
            return Err(MorphDictError::io(destination, e));
        }

        if let Some(progress) = &self.progress {
            progress.finished(received_bytes);
        }

        info!(received_bytes, written_bytes, "corpus downloaded");
        Ok(DownloadOutcome::Downloaded {
            received_bytes,
            written_bytes,
        })
    }

    /// Download the archive to `zip_path` and unpack its XML member to `out_path`.
    async fn fetch_zipped(&self, zip_path: &Path, out_path: &Path) -> Result<(u64, u64)> {
        let received = self.stream_body(zip_path).await?;

        let zip_owned = zip_path.to_path_buf();
        let out_owned = out_path.to_path_buf();
        let written = tokio::task::spawn_blocking(move || {
            archive::extract_xml_member(&zip_owned, &out_owned)
        })
        .await
        .map_err(|e| MorphDictError::io(zip_path, std::io::Error::other(e)))??;

        Ok((received, written))
    }

    /// Stream the response body into `path`, returning the byte count.
    async fn stream_body(&self, path: &Path) -> Result<u64> {
        let url = &self.url;
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MorphDictError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MorphDictError::Network(format!("{url}: HTTP {status}")));
        }

        let total = response.content_length();
        debug!(?total, "response headers received");
        if let Some(progress) = &self.progress {
            progress.started(total);
        }

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| MorphDictError::io(path, e))?;

        let mut downloaded: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MorphDictError::Network(format!("{url}: failed to read body: {e}")))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| MorphDictError::io(path, e))?;
            downloaded += chunk.len() as u64;
            if let Some(progress) = &self.progress {
                progress.advanced(downloaded);
            }
        }

        file.flush().await.map_err(|e| MorphDictError::io(path, e))?;

        if let Some(expected) = total {
            if expected != downloaded {
                return Err(MorphDictError::Network(format!(
                    "{url}: body truncated ({downloaded} of {expected} bytes)"
                )));
            }
        }

        Ok(downloaded)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_zip(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".zip")
}

/// `dict.xml` + `.part` → `dict.xml.part`, in the same directory.
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed temp file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp file"),
    }
}
