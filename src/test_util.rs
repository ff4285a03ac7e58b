use std::{
    collections::HashMap,
    fs,
    io::{self, Cursor, Read, Result, Write},
    path::{Path, PathBuf},
};

use assert2::assert;
use chrono::Utc;
use proptest::strategy::Strategy;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::Archive;

/// Returns a proptest strategy that minimizes to maximum read size
pub fn read_size_strategy() -> impl Strategy<Value = usize> {
    const MIN: usize = 1;
    const MAX: usize = 8192;
    (MIN..=MAX).prop_map(|v| MAX + MIN - v)
}

/// File names and contents for a flat test directory.
pub fn content_strategy() -> impl Strategy<Value = HashMap<String, Vec<u8>>> {
    proptest::collection::hash_map(
        "[a-z]{1,8}",
        proptest::collection::vec(proptest::bits::u8::ANY, 0..100),
        0..10,
    )
}

/// Takes a readable, collects all data to vec.
/// Size of each read can be specified
pub fn read_to_vec(reader: &mut impl Read, read_size: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    loop {
        let size_before = buffer.len();
        buffer.resize(size_before + read_size, 0);
        let write_slice = &mut buffer[size_before..];
        assert!(write_slice.len() == read_size);

        let size_read = reader.read(write_slice)?;

        buffer.truncate(size_before + size_read);

        if size_read == 0 {
            return Ok(buffer);
        }
    }
}

/// Writer that accepts bytes up to a limit, then fails a single write call
/// and works normally afterwards.
#[derive(Debug, Default)]
pub struct FailingWriter {
    pub data: Vec<u8>,
    fail_at: Option<usize>,
}

impl FailingWriter {
    pub fn new(fail_at: usize) -> Self {
        FailingWriter {
            data: Vec::new(),
            fail_at: Some(fail_at),
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if let Some(fail_at) = self.fail_at {
            let room = fail_at.saturating_sub(self.data.len());
            if room == 0 {
                self.fail_at = None;
                return Err(io::Error::other("Simulated write failure"));
            }
            let size = buf.len().min(room);
            self.data.extend_from_slice(&buf[..size]);
            return Ok(size);
        }

        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Archive with a fixed timezone, so that DOS timestamps don't depend on the machine.
pub fn utc_archive<W: Write>(sink: W) -> Archive<W> {
    let mut archive = Archive::new(sink);
    archive.system_time_timezone(Utc);
    archive
}

pub fn write_test_file(directory: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = directory.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn open_zip(buf: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(buf)).expect("Should be a valid zip")
}

/// Creates a temp directory that contains a file in a subdirectory,
/// a top level file, an empty directory and (on unix) a symlink.
pub fn prepare_test_dir() -> TempDir {
    let tempdir = TempDir::new().unwrap();

    write_test_file(tempdir.path(), "subdir/file.txt", b"Hello world");
    write_test_file(tempdir.path(), "top.txt", b"top level");
    fs::create_dir(tempdir.path().join("empty")).unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink("subdir/file.txt", tempdir.path().join("link")).unwrap();

    tempdir
}
