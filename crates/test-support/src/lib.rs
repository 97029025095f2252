#![deny(unsafe_code)]

//! crates/test-support/src/lib.rs
//!
//! Helpers shared by the workspace test suites: in-memory sinks that record
//! what the logging core wrote, sinks that fail or stall on demand, and an
//! exit interceptor that turns a process exit into a catchable panic.

use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// In-memory writer whose clones share one buffer.
///
/// Hand one clone to the code under test and keep another to inspect the
/// bytes written and the number of flushes observed.
#[derive(Clone, Debug, Default)]
pub struct CaptureSink {
    buffer: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<AtomicUsize>,
}

impl CaptureSink {
    /// Creates an empty capture sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Returns a copy of the raw bytes written so far.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the written output split into lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Number of times `flush` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Discards the captured output.
    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Writer that rejects every write and flush.
#[derive(Clone, Debug, Default)]
pub struct FailingSink {
    attempts: Arc<AtomicUsize>,
}

impl FailingSink {
    /// Creates a failing sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write attempts observed.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }
}

/// Writer whose flush sleeps before returning, standing in for a flush hook
/// that hangs.
#[derive(Clone, Debug)]
pub struct StallingSink {
    inner: CaptureSink,
    stall: Duration,
}

impl StallingSink {
    /// Creates a sink whose flush blocks for `stall`.
    #[must_use]
    pub fn new(stall: Duration) -> Self {
        Self {
            inner: CaptureSink::new(),
            stall,
        }
    }

    /// Returns the capture buffer receiving the writes.
    #[must_use]
    pub fn capture(&self) -> CaptureSink {
        self.inner.clone()
    }
}

impl Write for StallingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        thread::sleep(self.stall);
        self.inner.flush()
    }
}

/// Panic payload raised by [`intercept_exit`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExitRequest(pub i32);

/// Exit handler for tests: unwinds with an [`ExitRequest`] instead of ending
/// the process.
pub fn intercept_exit(code: i32) -> ! {
    panic::panic_any(ExitRequest(code))
}

/// Runs `f` and returns the status passed to [`intercept_exit`], or `None`
/// when `f` returned normally.
///
/// Panics that are not exit requests are propagated.
pub fn catch_exit<F>(f: F) -> Option<i32>
where
    F: FnOnce(),
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => None,
        Err(payload) => match payload.downcast::<ExitRequest>() {
            Ok(request) => Some(request.0),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// Creates a temporary directory and returns it together with a log file
/// path inside it.
pub fn temp_log_path(name: &str) -> io::Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(name);
    Ok((dir, path))
}
