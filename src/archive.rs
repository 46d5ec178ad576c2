//! Archive extraction into a target directory
//!
//! Supports the two formats runtimes are published in:
//! - `tar.gz` - streamed straight from the response body
//! - `zip` - buffered first, since the central directory sits at the end
//!
//! Entry paths are kept relative to the target (`lib/foo.txt` lands at
//! `<dest>/lib/foo.txt`). Entries that would land outside the target are
//! rejected. Existing files in the target are overwritten or left alone, never
//! removed.

use std::fs;
use std::io::{self, Cursor, ErrorKind, Read, Write};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;
use zip::ZipArchive;

use crate::error::InstallError;

/// Container format of a runtime archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

/// Unpack `reader` as `format` into `dest`, creating `dest` if needed.
///
/// # Errors
/// * `InstallError::CorruptArchive` - The bytes do not parse as `format`, the
///   archive is empty, or an entry escapes `dest`
/// * `InstallError::WriteFailed` - A file or directory could not be created
pub fn extract(reader: impl Read, format: ArchiveFormat, dest: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(dest).map_err(|source| InstallError::WriteFailed {
        path: dest.to_path_buf(),
        source,
    })?;

    let count = match format {
        ArchiveFormat::TarGz => extract_tar_gz(reader, dest)?,
        ArchiveFormat::Zip => extract_zip(reader, dest)?,
    };

    debug!("Extracted {} {} entries into {:?}", count, format.as_str(), dest);
    Ok(())
}

fn extract_tar_gz(reader: impl Read, dest: &Path) -> Result<usize, InstallError> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);

    let mut count = 0;
    for entry in archive.entries().map_err(InstallError::corrupt)? {
        let mut entry = entry.map_err(InstallError::corrupt)?;
        let path = entry.path().map_err(InstallError::corrupt)?.into_owned();

        if !is_enclosed(&path) {
            return Err(escapes_target(&path));
        }

        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| classify_io_error(e, &dest.join(&path)))?;
        if !unpacked {
            return Err(escapes_target(&path));
        }
        count += 1;
    }

    // An empty body decodes to an empty tar stream
    if count == 0 {
        return Err(InstallError::corrupt("archive contains no entries"));
    }
    Ok(count)
}

fn extract_zip(mut reader: impl Read, dest: &Path) -> Result<usize, InstallError> {
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .map_err(InstallError::corrupt)?;

    let mut archive = ZipArchive::new(Cursor::new(buffer)).map_err(InstallError::corrupt)?;
    if archive.len() == 0 {
        return Err(InstallError::corrupt("archive contains no entries"));
    }

    // Check every name before writing anything
    for i in 0..archive.len() {
        let file = archive.by_index_raw(i).map_err(InstallError::corrupt)?;
        if file.enclosed_name().is_none() {
            return Err(escapes_target(Path::new(file.name())));
        }
    }

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(InstallError::corrupt)?;
        let Some(relative) = file.enclosed_name() else {
            return Err(escapes_target(Path::new(file.name())));
        };
        let out_path = dest.join(relative);

        if file.is_dir() {
            create_dir(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            create_dir(parent)?;
        }

        let declared = file.size();
        copy_entry(&mut file, &out_path, declared)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode)).map_err(
                |source| InstallError::WriteFailed {
                    path: out_path.clone(),
                    source,
                },
            )?;
        }
    }

    Ok(archive.len())
}

/// Stream one zip entry to `out_path`, checking the byte count against the
/// size declared in the central directory.
fn copy_entry(entry: &mut impl Read, out_path: &Path, declared: u64) -> Result<(), InstallError> {
    let write_failed = |source: io::Error| InstallError::WriteFailed {
        path: out_path.to_path_buf(),
        source,
    };
    let mut out = fs::File::create(out_path).map_err(write_failed)?;

    let mut buf = [0u8; 64 * 1024];
    let mut written: u64 = 0;
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(InstallError::corrupt(e)),
        };
        written += n as u64;
        if written > declared {
            return Err(size_mismatch(out_path, declared));
        }
        out.write_all(&buf[..n]).map_err(write_failed)?;
    }

    if written != declared {
        return Err(size_mismatch(out_path, declared));
    }
    Ok(())
}

fn size_mismatch(path: &Path, declared: u64) -> InstallError {
    InstallError::corrupt(format!(
        "entry {path:?} does not match its declared size of {declared} bytes"
    ))
}

fn create_dir(path: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(path).map_err(|source| InstallError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// True if `path` stays below the directory it is joined onto
fn is_enclosed(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn escapes_target(path: &Path) -> InstallError {
    InstallError::corrupt(format!("entry {path:?} escapes the target directory"))
}

/// Decoder failures surface as invalid input/data; anything else comes from
/// the local filesystem.
fn classify_io_error(err: io::Error, path: &Path) -> InstallError {
    match err.kind() {
        ErrorKind::InvalidInput | ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
            InstallError::corrupt(err)
        }
        _ => InstallError::WriteFailed {
            path: PathBuf::from(path),
            source: err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use rstest::rstest;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().unix_permissions(0o755);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Stored single-entry zip whose central directory claims `declared`
    /// uncompressed bytes
    fn zip_with_declared_size(content: &str, large_file: bool, declared: u64) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .large_file(large_file);
        writer.start_file("lib/foo.txt", options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        let central = bytes
            .windows(4)
            .position(|w| w == [0x50, 0x4b, 0x01, 0x02])
            .unwrap();
        if large_file {
            // Zip64 extra field right after the name: tag, length, uncompressed size
            let name_len = usize::from(u16::from_le_bytes([
                bytes[central + 28],
                bytes[central + 29],
            ]));
            let at = central + 46 + name_len + 4;
            bytes[at..at + 8].copy_from_slice(&declared.to_le_bytes());
        } else {
            let declared = u32::try_from(declared).unwrap();
            bytes[central + 24..central + 28].copy_from_slice(&declared.to_le_bytes());
        }
        bytes
    }

    /// Tar header with a raw name, bypassing the builder's path checks
    fn tar_gz_with_raw_name(name: &[u8], content: &str) -> Vec<u8> {
        let mut header = tar::Header::new_old();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        builder.append(&header, content.as_bytes()).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[rstest]
    #[case(ArchiveFormat::TarGz)]
    #[case(ArchiveFormat::Zip)]
    fn extract_materializes_nested_entries(#[case] format: ArchiveFormat) {
        let entries = [("lib/foo.txt", "foo"), ("bin/ruby", "#!/bin/sh\n")];
        let bytes = match format {
            ArchiveFormat::TarGz => tar_gz(&entries),
            ArchiveFormat::Zip => zip_archive(&entries),
        };
        let dest = TempDir::new().unwrap();

        extract(Cursor::new(bytes), format, dest.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dest.path().join("lib/foo.txt")).unwrap(),
            "foo"
        );
        assert!(dest.path().join("bin/ruby").is_file());
    }

    #[rstest]
    #[case(ArchiveFormat::TarGz, Vec::new())]
    #[case(ArchiveFormat::TarGz, b"definitely not gzip".to_vec())]
    #[case(ArchiveFormat::Zip, Vec::new())]
    #[case(ArchiveFormat::Zip, b"definitely not zip".to_vec())]
    fn extract_rejects_bytes_of_wrong_format(
        #[case] format: ArchiveFormat,
        #[case] bytes: Vec<u8>,
    ) {
        let dest = TempDir::new().unwrap();

        let result = extract(Cursor::new(bytes), format, dest.path());

        assert!(matches!(result, Err(InstallError::CorruptArchive { .. })));
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn extract_rejects_zip_declared_as_tar_gz() {
        let dest = TempDir::new().unwrap();

        let result = extract(
            Cursor::new(zip_archive(&[("lib/foo.txt", "foo")])),
            ArchiveFormat::TarGz,
            dest.path(),
        );

        assert!(matches!(result, Err(InstallError::CorruptArchive { .. })));
    }

    #[test]
    fn extract_rejects_truncated_zip() {
        let mut bytes = zip_archive(&[("lib/foo.txt", "foo")]);
        bytes.truncate(bytes.len() / 2);
        let dest = TempDir::new().unwrap();

        let result = extract(Cursor::new(bytes), ArchiveFormat::Zip, dest.path());

        assert!(matches!(result, Err(InstallError::CorruptArchive { .. })));
        assert!(!dest.path().join("lib/foo.txt").exists());
    }

    #[rstest]
    #[case::zip64_size_beyond_memory(true, 1u64 << 62)]
    #[case::size_larger_than_content(false, 0xFFFF_FFF0)]
    #[case::size_smaller_than_content(false, 1)]
    fn extract_rejects_zip_entry_with_wrong_declared_size(
        #[case] large_file: bool,
        #[case] declared: u64,
    ) {
        let dest = TempDir::new().unwrap();

        let result = extract(
            Cursor::new(zip_with_declared_size("foo", large_file, declared)),
            ArchiveFormat::Zip,
            dest.path(),
        );

        assert!(matches!(result, Err(InstallError::CorruptArchive { .. })));
    }

    #[test]
    fn extract_rejects_tar_entry_escaping_target() {
        let root = TempDir::new().unwrap();
        let dest = root.path().join("layer");

        let result = extract(
            Cursor::new(tar_gz_with_raw_name(b"../evil.txt", "evil")),
            ArchiveFormat::TarGz,
            &dest,
        );

        assert!(matches!(result, Err(InstallError::CorruptArchive { .. })));
        assert!(!root.path().join("evil.txt").exists());
    }

    #[test]
    fn extract_rejects_zip_entry_escaping_target() {
        let root = TempDir::new().unwrap();
        let dest = root.path().join("layer");

        let result = extract(
            Cursor::new(zip_archive(&[("lib/ok.txt", "ok"), ("../evil.txt", "evil")])),
            ArchiveFormat::Zip,
            &dest,
        );

        assert!(matches!(result, Err(InstallError::CorruptArchive { .. })));
        assert!(!root.path().join("evil.txt").exists());
        assert!(!dest.join("lib/ok.txt").exists());
    }

    #[test]
    fn extract_overlays_existing_contents() {
        let dest = TempDir::new().unwrap();
        fs::create_dir_all(dest.path().join("lib")).unwrap();
        fs::write(dest.path().join("lib/stale.txt"), "stale").unwrap();
        fs::write(dest.path().join("lib/foo.txt"), "old").unwrap();

        extract(
            Cursor::new(tar_gz(&[("lib/foo.txt", "new")])),
            ArchiveFormat::TarGz,
            dest.path(),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(dest.path().join("lib/foo.txt")).unwrap(),
            "new"
        );
        assert_eq!(
            fs::read_to_string(dest.path().join("lib/stale.txt")).unwrap(),
            "stale"
        );
    }

    #[cfg(unix)]
    #[test]
    fn extract_zip_keeps_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dest = TempDir::new().unwrap();

        extract(
            Cursor::new(zip_archive(&[("bin/dart", "binary")])),
            ArchiveFormat::Zip,
            dest.path(),
        )
        .unwrap();

        let mode = fs::metadata(dest.path().join("bin/dart"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[rstest]
    #[case("lib/foo.txt", true)]
    #[case("./lib/foo.txt", true)]
    #[case("../foo.txt", false)]
    #[case("lib/../../foo.txt", false)]
    #[case("/etc/passwd", false)]
    fn is_enclosed_detects_escaping_paths(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_enclosed(Path::new(path)), expected);
    }
}
