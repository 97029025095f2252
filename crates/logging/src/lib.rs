#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging/src/lib.rs
//!
//! # Overview
//!
//! `logging` is a leveled logger. Every statement writes one line of the form
//!
//! ```text
//! Lmmdd hh:mm:ss.uuuuuu file:line] message
//! ```
//!
//! to a single output [`Sink`], where `L` is the severity character
//! (`I`, `W`, `E` or `F`). Informational statements can additionally be gated
//! on a verbosity level that is set globally and raised per source file with
//! glob overrides. Every written line is also offered, as a structured
//! [`Event`], to any number of live subscribers.
//!
//! # Design
//!
//! The crate is built from four parts:
//!
//! - [`Verbosity`] answers "is level `n` enabled at this call site?" with a
//!   lock-free fast path and a memo of per-site override resolutions.
//! - [`Event`] and [`Data`] carry a line's severity, rendered text, tagged
//!   values and, for `ERROR` and `FATAL`, a backtrace.
//! - [`Hub`] fans events out to subscribers through bounded queues without
//!   ever blocking an emitter.
//! - [`Logging`] renders, serializes and writes lines, counts them, and
//!   terminates the process after `FATAL`.
//!
//! Call sites are identified with `#[track_caller]`: every public emission
//! method records the location of the statement that invoked it.
//!
//! A process-wide instance backs the [`info!`], [`warning!`], [`error!`],
//! [`fatal!`] and [`exit!`] macros and their formatted `f` variants. It is
//! created lazily from the environment or installed explicitly with
//! [`init`].
//!
//! # Invariants
//!
//! - Lines never interleave in the sink, whatever the number of emitting
//!   threads.
//! - A subscriber never receives an event published before it registered.
//! - `FATAL` lines never return to the caller.
//!
//! # Errors
//!
//! Emission never fails. Sink errors are counted in [`Stats`] and the line is
//! dropped. Configuration setters return [`ConfigError`] and keep the previous
//! setting on failure.
//!
//! # Examples
//!
//! ```
//! use logging::{data, IntoArg, Logging, LoggingConfig, Severity};
//!
//! let config = LoggingConfig {
//!     flush_interval: None,
//!     ..LoggingConfig::default()
//! };
//! let log = Logging::builder().sink(Vec::new()).config(config).build();
//! let events = log.register();
//!
//! log.set_vmodule("lib=2").unwrap();
//! log.print(Severity::Info, &[IntoArg::into_arg(&"hello"), IntoArg::into_arg(&data("ctx"))]);
//!
//! let event = events.recv().unwrap();
//! assert!(event.message_str().ends_with("] hello"));
//! assert_eq!(event.find_data::<&str>(), Some(&"ctx"));
//! ```

mod arg;
mod config;
mod error;
mod event;
mod global;
mod hub;
mod levels;
mod logger;
mod macros;
mod pattern;
mod pipeline;
mod stats;
mod trace;
#[cfg(feature = "tracing")]
mod tracing_bridge;
mod verbosity;

pub use arg::{Arg, IntoArg, split_data};
pub use config::{
    DEFAULT_FLUSH_INTERVAL, DEFAULT_FLUSH_TIMEOUT, ENV_BACKTRACE_AT, ENV_VERBOSITY, ENV_VMODULE,
    LoggingConfig, MIN_FLUSH_INTERVAL,
};
pub use crossbeam_channel::Receiver;
pub use error::{ConfigError, InitError};
pub use event::{Data, ErrorArg, Event, FormatString, data};
pub use global::{
    flush, global, init, register, set_backtrace_at, set_verbosity, set_vmodule, stats, v,
};
pub use hub::{DEFAULT_RELAY_CAPACITY, DEFAULT_SUBSCRIBER_CAPACITY, Hub};
pub use levels::{CallSite, Level};
pub use logger::Logger;
pub use logging_sink::{FileSink, Severity, Sink};
pub use pattern::{ModulePattern, ModuleSpec};
pub use pipeline::{
    Clock, EXIT_STATUS, ExitHandler, FATAL_EXIT_STATUS, Logging, LoggingBuilder, Verbose,
};
pub use stats::{HubSnapshot, HubStats, OutputSnapshot, OutputStats, Stats, StatsSnapshot};
pub use trace::TraceLocation;
#[cfg(feature = "tracing")]
pub use tracing_bridge::{LoggingLayer, TracingField, init_tracing};
pub use verbosity::Verbosity;
