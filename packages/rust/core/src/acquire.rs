//! Acquisition stage: make sure a raw corpus file is on disk.

use std::path::Path;

use morphdict_shared::{MorphDictError, Result};
use tracing::{info, instrument};

use crate::collaborators::Downloader;

/// How the corpus for this run was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// A fresh export was downloaded.
    Downloaded,
    /// The file already on disk was reused.
    Reused,
}

/// Download the corpus if asked to, or if there is nothing to reuse.
///
/// A missing corpus is always downloaded, even when `download` is false.
/// Contents are not validated here; that is the compiler's job.
#[instrument(skip_all, fields(corpus = %corpus_path.display(), download))]
pub async fn acquire_corpus<D: Downloader>(
    downloader: &D,
    corpus_path: &Path,
    download: bool,
) -> Result<Acquisition> {
    let present = corpus_path.is_file();

    if !download && present {
        info!("reusing existing corpus");
        return Ok(Acquisition::Reused);
    }

    if !download {
        info!("no corpus on disk, downloading despite --no-download");
    } else {
        info!("downloading corpus");
    }

    downloader.fetch(corpus_path, true).await?;

    if !corpus_path.is_file() {
        return Err(MorphDictError::validation(format!(
            "downloader reported success but {} does not exist",
            corpus_path.display()
        )));
    }

    Ok(Acquisition::Downloaded)
}
