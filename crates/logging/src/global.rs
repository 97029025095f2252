//! crates/logging/src/global.rs
//! The process-wide logging instance used by the crate's macros.

use std::sync::OnceLock;

use crossbeam_channel::Receiver;

use crate::config::LoggingConfig;
use crate::error::{ConfigError, InitError};
use crate::event::Event;
use crate::levels::{CallSite, Level};
use crate::pipeline::{Logging, Verbose};
use crate::stats::StatsSnapshot;

static GLOBAL: OnceLock<Logging> = OnceLock::new();

/// Installs `logging` as the process-wide instance.
///
/// # Errors
///
/// Returns [`InitError::AlreadyInitialized`] if an instance was installed
/// earlier or was already created lazily by a logging call.
pub fn init(logging: Logging) -> Result<(), InitError> {
    GLOBAL
        .set(logging)
        .map_err(|_| InitError::AlreadyInitialized)
}

/// The process-wide instance.
///
/// Created on first use from the environment (see
/// [`LoggingConfig::from_env`]) writing to standard output, unless
/// [`init`] ran first.
pub fn global() -> &'static Logging {
    GLOBAL.get_or_init(|| {
        let config = LoggingConfig::from_env().unwrap_or_else(|e| {
            eprintln!("logging: ignoring invalid environment settings: {e}");
            LoggingConfig::default()
        });
        Logging::builder().config(config).build()
    })
}

/// Registers a subscriber on the process-wide instance.
pub fn register() -> Receiver<Event> {
    global().register()
}

/// Flushes the process-wide instance.
pub fn flush() {
    global().flush();
}

/// Gate for a V-level statement at the caller's location.
#[must_use]
#[track_caller]
pub fn v(level: impl Into<Level>) -> Verbose<'static> {
    global().v_at(CallSite::caller(), level.into())
}

/// Replaces the global verbosity of the process-wide instance.
pub fn set_verbosity(level: impl Into<Level>) {
    global().set_verbosity(level);
}

/// Replaces the module overrides of the process-wide instance.
///
/// # Errors
///
/// Returns the parse failure and keeps the previous overrides.
pub fn set_vmodule(spec: &str) -> Result<(), ConfigError> {
    global().set_vmodule(spec)
}

/// Replaces the backtrace trigger of the process-wide instance.
///
/// # Errors
///
/// Returns the parse failure and keeps the previous location.
pub fn set_backtrace_at(spec: &str) -> Result<(), ConfigError> {
    global().set_backtrace_at(spec)
}

/// Output counters of the process-wide instance.
#[must_use]
pub fn stats() -> StatsSnapshot {
    global().stats().snapshot()
}
