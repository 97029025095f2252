//! crates/logging/src/pipeline.rs
//! The emission pipeline: render, serialize, write, count, broadcast.
//!
//! # Design
//!
//! A [`Logging`] instance owns one output sink behind a mutex. Every line is
//! rendered into its own buffer before the lock is taken, together with the
//! backtrace requested by a matching trace location, so the critical section
//! covers only the sink write and the counter update. Event construction and
//! the broadcast happen after the lock is released. The trace location lives
//! outside the output lock and is read without blocking writers.
//!
//! `FATAL` lines never return: after writing the line (and, unless the quiet
//! exit variant was used, a backtrace of the emitting thread) the instance
//! offers the event to subscribers, flushes with a bound and calls its exit
//! handler. Delivery of that last event is best effort since the process may
//! end before the dispatcher runs.
//!
//! # Invariants
//!
//! - Lines written to the sink never interleave.
//! - Every written line ends with exactly one added newline unless the body
//!   already ended with one.
//! - Events are built only when at least one subscriber is registered.

use std::backtrace::Backtrace;
use std::fmt;
use std::io::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use crossbeam_channel::{Receiver, bounded, tick};
use logging_sink::{Severity, Sink, render_header};
use time::OffsetDateTime;

use crate::arg::{Arg, render_text, split_data};
use crate::config::{LoggingConfig, MIN_FLUSH_INTERVAL};
use crate::error::ConfigError;
use crate::event::{Data, Event, FormatString};
use crate::hub::Hub;
use crate::levels::{CallSite, Level};
use crate::pattern::ModuleSpec;
use crate::stats::{HubSnapshot, Stats};
use crate::trace::TraceLocation;
use crate::verbosity::Verbosity;

/// Exit status used after a `FATAL` line.
pub const FATAL_EXIT_STATUS: i32 = 255;
/// Exit status used after a quiet `FATAL` line.
pub const EXIT_STATUS: i32 = 1;

/// Function terminating the process after a `FATAL` line.
pub type ExitHandler = fn(i32) -> !;
/// Source of header timestamps.
pub type Clock = fn() -> OffsetDateTime;

const FLUSH_THREAD_NAME: &str = "logging-flush";
const FLUSH_DAEMON_THREAD_NAME: &str = "logging-flush-daemon";

struct Output {
    sink: Box<dyn Sink>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Termination {
    Dump,
    Quiet,
}

impl Termination {
    const fn status(self) -> i32 {
        match self {
            Self::Dump => FATAL_EXIT_STATUS,
            Self::Quiet => EXIT_STATUS,
        }
    }
}

/// Leveled logger writing to one sink and broadcasting to subscribers.
///
/// Most programs use the process-wide instance through the crate's macros;
/// tests and embedders build their own with [`Logging::builder`].
pub struct Logging {
    output: Arc<Mutex<Output>>,
    backtrace_at: ArcSwapOption<TraceLocation>,
    verbosity: Verbosity,
    hub: Hub,
    stats: Stats,
    clock: Clock,
    exit: ExitHandler,
    flush_timeout: Duration,
}

impl Logging {
    /// Starts building an instance.
    #[must_use]
    pub fn builder() -> LoggingBuilder {
        LoggingBuilder::default()
    }

    /// Builds an instance writing to `sink` with default settings.
    #[must_use]
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self::builder().sink(sink).build()
    }

    // --- verbosity ---

    /// Gate for a V-level statement at the caller's location.
    #[must_use]
    #[track_caller]
    pub fn v(&self, level: impl Into<Level>) -> Verbose<'_> {
        self.v_at(CallSite::caller(), level.into())
    }

    /// Gate for a V-level statement at `site`.
    #[must_use]
    pub fn v_at(&self, site: CallSite, level: Level) -> Verbose<'_> {
        Verbose {
            logging: self,
            enabled: self.verbosity.enabled(site, level),
        }
    }

    /// Reports whether a request at `level` from `site` is enabled.
    #[must_use]
    pub fn enabled(&self, site: CallSite, level: Level) -> bool {
        self.verbosity.enabled(site, level)
    }

    /// Current global verbosity.
    #[must_use]
    pub fn verbosity(&self) -> Level {
        self.verbosity.level()
    }

    /// Replaces the global verbosity.
    pub fn set_verbosity(&self, level: impl Into<Level>) {
        self.verbosity.set_level(level.into());
    }

    /// Current module overrides.
    #[must_use]
    pub fn vmodule(&self) -> ModuleSpec {
        self.verbosity.overrides()
    }

    /// Replaces the module overrides.
    pub fn set_overrides(&self, spec: ModuleSpec) {
        self.verbosity.set_overrides(spec);
    }

    /// Parses and installs module overrides.
    ///
    /// # Errors
    ///
    /// Returns the parse failure and keeps the previous overrides.
    pub fn set_vmodule(&self, spec: &str) -> Result<(), ConfigError> {
        self.set_overrides(spec.parse()?);
        Ok(())
    }

    /// Number of call sites with a memoised override resolution.
    #[must_use]
    pub fn cached_sites(&self) -> usize {
        self.verbosity.cached_sites()
    }

    // --- trace location ---

    /// Parses and installs the backtrace trigger; `""` clears it.
    ///
    /// # Errors
    ///
    /// Returns the parse failure and keeps the previous location.
    pub fn set_backtrace_at(&self, spec: &str) -> Result<(), ConfigError> {
        let location = TraceLocation::parse_optional(spec)?;
        self.backtrace_at.store(location.map(Arc::new));
        Ok(())
    }

    /// Current backtrace trigger.
    #[must_use]
    pub fn backtrace_at(&self) -> Option<TraceLocation> {
        self.backtrace_at.load_full().map(|location| (*location).clone())
    }

    // --- emission ---

    /// Emits a line at `severity` from the caller's location.
    ///
    /// Printable arguments are joined by single spaces; [`Arg::Data`]
    /// arguments are attached to the event instead. Returns the number of
    /// bytes handed to the sink. A `FATAL` severity does not return.
    #[track_caller]
    pub fn print(&self, severity: Severity, args: &[Arg<'_>]) -> usize {
        self.print_at(CallSite::caller(), severity, args)
    }

    /// Like [`Logging::print`] for an explicit call site.
    pub fn print_at(&self, site: CallSite, severity: Severity, args: &[Arg<'_>]) -> usize {
        let (text, data) = split_data(args);
        let body = render_text(&text);
        self.emit(site, severity, &body, data)
    }

    /// Emits a formatted line at `severity` from the caller's location.
    ///
    /// `format` is the literal the arguments were formatted from; it is
    /// appended to `data` as a [`FormatString`].
    #[track_caller]
    pub fn printf(
        &self,
        severity: Severity,
        format: &'static str,
        args: fmt::Arguments<'_>,
        data: &[Data],
    ) -> usize {
        self.printf_at(CallSite::caller(), severity, format, args, data)
    }

    /// Like [`Logging::printf`] for an explicit call site.
    pub fn printf_at(
        &self,
        site: CallSite,
        severity: Severity,
        format: &'static str,
        args: fmt::Arguments<'_>,
        data: &[Data],
    ) -> usize {
        let body = fmt::format(args);
        self.emit(site, severity, &body, with_format(data, format))
    }

    /// Emits an `INFO` line.
    #[track_caller]
    pub fn info(&self, args: &[Arg<'_>]) -> usize {
        self.print_at(CallSite::caller(), Severity::Info, args)
    }

    /// Emits a `WARNING` line.
    #[track_caller]
    pub fn warning(&self, args: &[Arg<'_>]) -> usize {
        self.print_at(CallSite::caller(), Severity::Warning, args)
    }

    /// Emits an `ERROR` line.
    #[track_caller]
    pub fn error(&self, args: &[Arg<'_>]) -> usize {
        self.print_at(CallSite::caller(), Severity::Error, args)
    }

    /// Emits a `FATAL` line with a backtrace, then exits with status 255.
    #[track_caller]
    pub fn fatal(&self, args: &[Arg<'_>]) -> ! {
        let (text, data) = split_data(args);
        let body = render_text(&text);
        self.terminate(CallSite::caller(), &body, data, Termination::Dump)
    }

    /// Emits a formatted `FATAL` line with a backtrace, then exits with
    /// status 255.
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        let body = fmt::format(args);
        self.terminate(CallSite::caller(), &body, Vec::new(), Termination::Dump)
    }

    /// Emits a `FATAL` line without a backtrace, then exits with status 1.
    #[track_caller]
    pub fn exit(&self, args: &[Arg<'_>]) -> ! {
        let (text, data) = split_data(args);
        let body = render_text(&text);
        self.terminate(CallSite::caller(), &body, data, Termination::Quiet)
    }

    /// Emits a formatted `FATAL` line without a backtrace, then exits with
    /// status 1.
    #[track_caller]
    pub fn exitf(&self, args: fmt::Arguments<'_>) -> ! {
        let body = fmt::format(args);
        self.terminate(CallSite::caller(), &body, Vec::new(), Termination::Quiet)
    }

    /// Emits a `WARNING` line when `result` is an error, appending `": err"`.
    #[track_caller]
    pub fn warning_if<T, E: fmt::Display>(&self, result: &Result<T, E>, args: &[Arg<'_>]) {
        if let Err(err) = result {
            self.emit_failure(CallSite::caller(), Severity::Warning, err, args);
        }
    }

    /// Emits an `ERROR` line when `result` is an error, appending `": err"`.
    #[track_caller]
    pub fn error_if<T, E: fmt::Display>(&self, result: &Result<T, E>, args: &[Arg<'_>]) {
        if let Err(err) = result {
            self.emit_failure(CallSite::caller(), Severity::Error, err, args);
        }
    }

    /// Emits a `FATAL` line when `result` is an error, appending `": err"`.
    #[track_caller]
    pub fn fatal_if<T, E: fmt::Display>(&self, result: &Result<T, E>, args: &[Arg<'_>]) {
        if let Err(err) = result {
            self.emit_failure(CallSite::caller(), Severity::Fatal, err, args);
        }
    }

    /// Builds an `ERROR` event from the caller's location without writing it.
    #[must_use]
    #[track_caller]
    pub fn error_event(&self, args: &[Arg<'_>]) -> Event {
        let site = CallSite::caller();
        let (text, data) = split_data(args);
        let body = render_text(&text);
        let (line, message_len) = self.render_line(site, Severity::Error, &body);
        Event::new(Severity::Error, &line[..message_len], data, site)
    }

    // --- subscribers and stats ---

    /// Registers a subscriber; see [`Hub::register`].
    pub fn register(&self) -> Receiver<Event> {
        self.hub.register()
    }

    /// Output counters.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Event distribution counters.
    #[must_use]
    pub fn hub_stats(&self) -> HubSnapshot {
        self.hub.stats()
    }

    // --- flushing ---

    /// Flushes the sink, waiting for any in-progress write.
    pub fn flush(&self) {
        flush_output(&self.output);
    }

    /// Flushes on a helper thread, giving up after `timeout`.
    ///
    /// Returns `false` when the flush did not finish in time; a notice is
    /// then written to standard error.
    pub fn timeout_flush(&self, timeout: Duration) -> bool {
        let output = Arc::clone(&self.output);
        let (done_tx, done_rx) = bounded(1);
        let spawned = thread::Builder::new()
            .name(FLUSH_THREAD_NAME.to_string())
            .spawn(move || {
                flush_output(&output);
                let _ = done_tx.send(());
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "failed to start flush thread");
            return false;
        }
        if done_rx.recv_timeout(timeout).is_ok() {
            return true;
        }
        eprintln!("logging: flush took longer than {timeout:?}");
        tracing::warn!(?timeout, "flush timed out");
        false
    }

    // --- internals ---

    fn emit_failure(
        &self,
        site: CallSite,
        severity: Severity,
        err: &dyn fmt::Display,
        args: &[Arg<'_>],
    ) {
        let (text, data) = split_data(args);
        let mut body = render_text(&text);
        body.push_str(": ");
        body.push_str(&err.to_string());
        self.emit(site, severity, &body, data);
    }

    /// Renders `header + body + "\n"`, returning the line and the length of
    /// the message without the added newline.
    fn render_line(&self, site: CallSite, severity: Severity, body: &str) -> (Vec<u8>, usize) {
        let mut line = Vec::with_capacity(body.len() + 48);
        render_header(&mut line, severity, (self.clock)(), site.file_name(), site.line());
        line.extend_from_slice(body.as_bytes());
        let message_len = if line.last() == Some(&b'\n') {
            line.len() - 1
        } else {
            line.push(b'\n');
            line.len() - 1
        };
        (line, message_len)
    }

    fn emit(&self, site: CallSite, severity: Severity, body: &str, data: Vec<Data>) -> usize {
        if severity == Severity::Fatal {
            self.terminate(site, body, data, Termination::Dump);
        }
        let (mut line, message_len) = self.render_line(site, severity, body);
        if self.traced(site) {
            let _ = writeln!(line, "{}", Backtrace::force_capture());
        }
        let written = {
            let mut output = self.lock_output();
            let written = write_line(&mut output, &line, &self.stats);
            if written > 0 {
                self.stats.add_output(severity, written);
            }
            written
        };
        if self.hub.has_subscribers() {
            self.hub
                .publish(Event::new(severity, &line[..message_len], data, site));
        }
        written
    }

    fn terminate(
        &self,
        site: CallSite,
        body: &str,
        data: Vec<Data>,
        termination: Termination,
    ) -> ! {
        let (mut line, message_len) = self.render_line(site, Severity::Fatal, body);
        if self.traced(site) {
            let _ = writeln!(line, "{}", Backtrace::force_capture());
        }
        {
            let mut output = self.lock_output();
            write_line(&mut output, &line, &self.stats);
            if termination == Termination::Dump {
                let dump = stack_dump();
                write_line(&mut output, dump.as_bytes(), &self.stats);
            }
        }
        if self.hub.has_subscribers() {
            self.hub
                .publish(Event::new(Severity::Fatal, &line[..message_len], data, site));
        }
        self.timeout_flush(self.flush_timeout);
        (self.exit)(termination.status())
    }

    fn traced(&self, site: CallSite) -> bool {
        let current = self.backtrace_at.load();
        (*current)
            .as_ref()
            .is_some_and(|location| location.matches(&site))
    }

    fn lock_output(&self) -> MutexGuard<'_, Output> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging")
            .field("verbosity", &self.verbosity)
            .field("hub", &self.hub)
            .field("stats", &self.stats)
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}

fn with_format(data: &[Data], format: &'static str) -> Vec<Data> {
    let mut data = data.to_vec();
    data.push(Data::new(FormatString(format)));
    data
}

// Returns the number of bytes accepted; failures count the whole line as lost.
fn write_line(output: &mut Output, line: &[u8], stats: &Stats) -> usize {
    match output.sink.write(line) {
        Ok(n) => n,
        Err(e) => {
            stats.add_lost(line.len());
            tracing::trace!(error = %e, bytes = line.len(), "log sink rejected write");
            0
        }
    }
}

fn flush_output(output: &Mutex<Output>) {
    let mut output = output.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = output.sink.flush() {
        tracing::trace!(error = %e, "log sink flush failed");
    }
}

fn stack_dump() -> String {
    let current = thread::current();
    let name = current.name().unwrap_or("<unnamed>");
    format!(
        "\nthread '{name}' backtrace:\n{}\n",
        Backtrace::force_capture()
    )
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn process_exit(code: i32) -> ! {
    std::process::exit(code)
}

fn spawn_flush_daemon(output: &Arc<Mutex<Output>>, interval: Duration) {
    let output: Weak<Mutex<Output>> = Arc::downgrade(output);
    let spawned = thread::Builder::new()
        .name(FLUSH_DAEMON_THREAD_NAME.to_string())
        .spawn(move || {
            for _ in tick(interval) {
                let Some(output) = output.upgrade() else {
                    break;
                };
                flush_output(&output);
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "failed to start flush daemon");
    }
}

/// Result of a V-level check.
///
/// Emission methods are no-ops when the gate is disabled.
#[derive(Clone, Copy, Debug)]
pub struct Verbose<'a> {
    logging: &'a Logging,
    enabled: bool,
}

impl Verbose<'_> {
    /// Reports whether the level was enabled.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Emits an `INFO` line if enabled.
    #[track_caller]
    pub fn info(&self, args: &[Arg<'_>]) {
        if self.enabled {
            self.logging
                .print_at(CallSite::caller(), Severity::Info, args);
        }
    }

    /// Emits a formatted `INFO` line if enabled.
    #[track_caller]
    pub fn infof(&self, format: &'static str, args: fmt::Arguments<'_>) {
        if self.enabled {
            self.logging
                .printf_at(CallSite::caller(), Severity::Info, format, args, &[]);
        }
    }
}

/// Builder for [`Logging`].
pub struct LoggingBuilder {
    sink: Option<Box<dyn Sink>>,
    config: LoggingConfig,
    clock: Clock,
    exit: ExitHandler,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            sink: None,
            config: LoggingConfig::default(),
            clock: local_now,
            exit: process_exit,
        }
    }
}

impl LoggingBuilder {
    /// Destination of rendered lines. Defaults to standard output.
    #[must_use]
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Settings to start from.
    #[must_use]
    pub fn config(mut self, config: LoggingConfig) -> Self {
        self.config = config;
        self
    }

    /// Timestamp source for headers. Defaults to local time, falling back to
    /// UTC when the local offset cannot be determined.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Handler invoked after a `FATAL` line. Defaults to
    /// [`std::process::exit`].
    #[must_use]
    pub fn exit_handler(mut self, exit: ExitHandler) -> Self {
        self.exit = exit;
        self
    }

    /// Builds the instance and starts the flush daemon if configured.
    #[must_use]
    pub fn build(self) -> Logging {
        let Self {
            sink,
            config,
            clock,
            exit,
        } = self;
        let sink = sink.unwrap_or_else(|| Box::new(std::io::stdout()));
        let output = Arc::new(Mutex::new(Output { sink }));
        if let Some(interval) = config.flush_interval {
            spawn_flush_daemon(&output, interval.max(MIN_FLUSH_INTERVAL));
        }
        Logging {
            output,
            backtrace_at: ArcSwapOption::from(config.backtrace_at.map(Arc::new)),
            verbosity: Verbosity::new(config.verbosity, config.vmodule),
            hub: Hub::new(config.relay_capacity, config.subscriber_capacity),
            stats: Stats::default(),
            clock,
            exit,
            flush_timeout: config.flush_timeout,
        }
    }
}

impl fmt::Debug for LoggingBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
