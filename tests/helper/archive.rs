//! In-memory archive fixtures

use std::io::{Cursor, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;

/// A `.tar.gz` holding `lib/foo.txt`, shaped like a runtime tarball
pub fn dummy_runtime_tar_gz() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let content = b"foo from tarball";
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    builder
        .append_data(&mut header, "lib/foo.txt", &content[..])
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

/// A `.zip` holding `lib/foo.txt`, shaped like an SDK archive
pub fn dummy_sdk_zip() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.add_directory("lib/", options).unwrap();
    writer.start_file("lib/foo.txt", options).unwrap();
    writer.write_all(b"foo from zip").unwrap();
    writer.finish().unwrap().into_inner()
}
