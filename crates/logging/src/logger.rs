//! crates/logging/src/logger.rs
//! Prefix and data sugar over a [`Logging`] instance.

use std::fmt;
use std::sync::Arc;

use logging_sink::Severity;

use crate::arg::Arg;
use crate::event::Data;
use crate::levels::CallSite;
use crate::pipeline::Logging;

/// A handle that prepends a fixed prefix and attaches fixed data to every
/// line it emits.
///
/// ```
/// use logging::{data, IntoArg, Logger, Logging};
///
/// let log = Logging::new(Vec::new());
/// let jobs = Logger::new(&log).with_prefix("[jobs]").with_data([data(7_u32)]);
/// jobs.info(&[IntoArg::into_arg(&"started")]);
/// ```
#[derive(Clone, Debug)]
pub struct Logger<'a> {
    logging: &'a Logging,
    prefix: Option<Arc<str>>,
    data: Vec<Data>,
}

impl<'a> Logger<'a> {
    /// Creates a handle with no prefix and no data.
    #[must_use]
    pub const fn new(logging: &'a Logging) -> Self {
        Self {
            logging,
            prefix: None,
            data: Vec::new(),
        }
    }

    /// Replaces the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<Arc<str>>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Replaces the attached data.
    #[must_use]
    pub fn with_data(mut self, data: impl IntoIterator<Item = Data>) -> Self {
        self.data = data.into_iter().collect();
        self
    }

    /// The prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Emits an `INFO` line.
    #[track_caller]
    pub fn info(&self, args: &[Arg<'_>]) -> usize {
        self.print(CallSite::caller(), Severity::Info, args)
    }

    /// Emits a `WARNING` line.
    #[track_caller]
    pub fn warning(&self, args: &[Arg<'_>]) -> usize {
        self.print(CallSite::caller(), Severity::Warning, args)
    }

    /// Emits an `ERROR` line.
    #[track_caller]
    pub fn error(&self, args: &[Arg<'_>]) -> usize {
        self.print(CallSite::caller(), Severity::Error, args)
    }

    /// Emits a formatted `INFO` line.
    #[track_caller]
    pub fn infof(&self, format: &'static str, args: fmt::Arguments<'_>) -> usize {
        self.printf(CallSite::caller(), Severity::Info, format, args)
    }

    /// Emits a formatted `WARNING` line.
    #[track_caller]
    pub fn warningf(&self, format: &'static str, args: fmt::Arguments<'_>) -> usize {
        self.printf(CallSite::caller(), Severity::Warning, format, args)
    }

    /// Emits a formatted `ERROR` line.
    #[track_caller]
    pub fn errorf(&self, format: &'static str, args: fmt::Arguments<'_>) -> usize {
        self.printf(CallSite::caller(), Severity::Error, format, args)
    }

    fn print(&self, site: CallSite, severity: Severity, args: &[Arg<'_>]) -> usize {
        let mut full = Vec::with_capacity(args.len() + self.data.len() + 1);
        if let Some(prefix) = &self.prefix {
            full.push(Arg::Text(prefix));
        }
        full.extend_from_slice(args);
        full.extend(self.data.iter().cloned().map(Arg::Data));
        self.logging.print_at(site, severity, &full)
    }

    fn printf(
        &self,
        site: CallSite,
        severity: Severity,
        format: &'static str,
        args: fmt::Arguments<'_>,
    ) -> usize {
        match &self.prefix {
            Some(prefix) => self.logging.printf_at(
                site,
                severity,
                format,
                format_args!("{prefix} {args}"),
                &self.data,
            ),
            None => self
                .logging
                .printf_at(site, severity, format, args, &self.data),
        }
    }
}
