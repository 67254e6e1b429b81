//! Unpacking of zipped corpus exports.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use morphdict_shared::{MorphDictError, Result};
use tracing::debug;

/// Extract the first `.xml` member of a zip archive to `out_path`.
///
/// Returns the number of bytes written.
pub(crate) fn extract_xml_member(archive_path: &Path, out_path: &Path) -> Result<u64> {
    let file = File::open(archive_path).map_err(|e| MorphDictError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
        MorphDictError::parse(format!(
            "invalid zip archive {}: {e}",
            archive_path.display()
        ))
    })?;

    let member_name = archive
        .file_names()
        .find(|name| name.ends_with(".xml"))
        .map(str::to_string)
        .ok_or_else(|| {
            MorphDictError::parse(format!(
                "zip archive {} contains no .xml member",
                archive_path.display()
            ))
        })?;

    let mut member = archive.by_name(&member_name).map_err(|e| {
        MorphDictError::parse(format!("cannot read '{member_name}' from archive: {e}"))
    })?;

    let out = File::create(out_path).map_err(|e| MorphDictError::io(out_path, e))?;
    let mut writer = BufWriter::new(out);
    let bytes = std::io::copy(&mut member, &mut writer).map_err(|e| MorphDictError::io(out_path, e))?;
    writer.flush().map_err(|e| MorphDictError::io(out_path, e))?;

    debug!(member = %member_name, bytes, "extracted archive member");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in members {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn extracts_xml_member() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("dict.zip");
        write_zip(
            &archive,
            &[("README.txt", "not this"), ("dict.opcorpora.xml", "<dictionary/>")],
        );

        let out = tmp.path().join("dict.xml");
        let bytes = extract_xml_member(&archive, &out).unwrap();
        assert_eq!(bytes, "<dictionary/>".len() as u64);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "<dictionary/>");
    }

    #[test]
    fn archive_without_xml_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("dict.zip");
        write_zip(&archive, &[("README.txt", "nothing here")]);

        let err = extract_xml_member(&archive, &tmp.path().join("dict.xml")).unwrap_err();
        assert!(err.to_string().contains("no .xml member"));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("dict.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract_xml_member(&archive, &tmp.path().join("dict.xml")).unwrap_err();
        assert!(err.to_string().contains("invalid zip archive"));
    }
}
