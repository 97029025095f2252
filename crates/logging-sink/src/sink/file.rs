//! crates/logging-sink/src/sink/file.rs
//! Append-only file sink.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::Sink;

/// Sink that appends to a single file.
///
/// Writes go through a [`BufWriter`]; [`Sink::flush`] drains the buffer and
/// then calls [`File::sync_all`] so flushed lines survive a crash.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Opens `path` for appending, creating it when missing.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Returns the path this sink appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.writer.write_all(bytes)?;
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.writer)?;
        self.writer.get_ref().sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_makes_lines_visible_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");

        let mut sink = FileSink::open(&path).expect("open");
        sink.write(b"first\n").unwrap();
        sink.write(b"second\n").unwrap();
        sink.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
        assert_eq!(sink.path(), path.as_path());
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");

        {
            let mut sink = FileSink::open(&path).unwrap();
            sink.write(b"one\n").unwrap();
            sink.flush().unwrap();
        }
        let mut sink = FileSink::open(&path).unwrap();
        sink.write(b"two\n").unwrap();
        sink.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("app.log");
        assert!(FileSink::open(path).is_err());
    }
}
