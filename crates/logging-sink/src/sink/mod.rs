//! crates/logging-sink/src/sink/mod.rs
//! The byte sink contract used by the emission pipeline.

use std::io::{self, Write};

mod file;

pub use file::FileSink;

/// Raw byte destination with a flush hook.
///
/// The logging core calls [`write`](Self::write) once per rendered line while
/// holding its serialization lock and calls [`flush`](Self::flush) from the
/// periodic flush daemon, explicit flushes, and the fatal path. Errors are
/// reported to the core, which counts them and carries on; implementations
/// should not retry internally.
pub trait Sink: Send {
    /// Writes the whole buffer and returns the number of bytes accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Pushes buffered bytes to their final destination.
    fn flush(&mut self) -> io::Result<()>;
}

impl<W> Sink for W
where
    W: Write + Send,
{
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        Write::write_all(self, bytes)?;
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}
