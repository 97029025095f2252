#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` holds the collaborators the `logging` core writes through:
//! the closed [`Severity`] enumeration, the [`Sink`] trait describing a raw
//! byte destination with a flush hook, a [`FileSink`] that syncs to disk on
//! flush, and [`render_header`], which produces the fixed-format line prefix.
//!
//! # Design
//!
//! The core performs no buffering decisions of its own. It renders a complete
//! line into a scratch [`Vec<u8>`] and hands the bytes to a [`Sink`] while
//! holding its serialization lock, so sink implementations never observe
//! interleaved writes. Any [`std::io::Write`] implementor that is [`Send`] is
//! a [`Sink`] through a blanket implementation, which covers stdout, stderr
//! and in-memory buffers.
//!
//! # Invariants
//!
//! - [`Severity`] is totally ordered: `Info < Warning < Error < Fatal`.
//! - Headers always have the shape
//!   `Lmmdd hh:mm:ss.uuuuuu file:line] ` where `L` is [`Severity::as_char`].
//!
//! # Examples
//!
//! ```
//! use logging_sink::{render_header, Severity, Sink};
//! use time::macros::datetime;
//!
//! let mut line = Vec::new();
//! render_header(&mut line, Severity::Warning, datetime!(2024-03-07 09:05:01.000042 UTC), "main.rs", 17);
//! line.extend_from_slice(b"disk almost full\n");
//!
//! let mut sink: Vec<u8> = Vec::new();
//! Sink::write(&mut sink, &line).unwrap();
//! assert_eq!(sink, b"W0307 09:05:01.000042 main.rs:17] disk almost full\n");
//! ```

mod header;
mod severity;
mod sink;

pub use header::{basename, render_header};
pub use severity::{ParseSeverityError, Severity};
pub use sink::{FileSink, Sink};
