//! Version stage: stamp the compiled dictionary with its build label.

use std::path::Path;

use morphdict_shared::{DictMeta, MorphDictError, Result, VersionStamp};
use tracing::{info, instrument};

use crate::collaborators::Loader;

/// Load the compiled dictionary, derive its stamp and persist it.
///
/// The file holds exactly `"<format>.<revision>"` with no trailing newline.
/// It is replaced atomically, so a failure anywhere leaves the previous file
/// as it was.
#[instrument(skip_all, fields(output = %output_dir.display(), version_file = %version_file.display()))]
pub fn write_version<L: Loader>(
    loader: &L,
    output_dir: &Path,
    version_file: &Path,
    format_version: &str,
) -> Result<(VersionStamp, DictMeta)> {
    let meta = loader.open(output_dir)?;
    let stamp = VersionStamp::derive(format_version, &meta)?;

    write_atomic(version_file, stamp.to_string().as_bytes())?;

    info!(version = %stamp, "version file written");
    Ok((stamp, meta))
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| MorphDictError::config(format!("{} has no file name", path.display())))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MorphDictError::io(parent, e))?;
    }

    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, contents).map_err(|e| MorphDictError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        MorphDictError::io(path, e)
    })
}
