//! crates/logging/src/event.rs
//! Structured records delivered to subscribers.
//!
//! # Overview
//!
//! Every line that passes the output stage is also offered to subscribers as
//! an [`Event`]: its severity, the rendered message (header included, trailing
//! newline excluded), the values the caller tagged with [`data`], and for
//! `ERROR` and `FATAL` a backtrace of the emitting thread.
//!
//! Tagged values are type-erased in [`Data`]. Subscribers recover them with
//! [`Data::downcast_ref`] or [`Event::find_data`]. Two tags are attached by the
//! crate itself: [`FormatString`] for formatted emissions and [`ErrorArg`],
//! which wraps an error together with its cause chain.

use std::any::{Any, type_name};
use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use logging_sink::Severity;

use crate::levels::CallSite;

/// A caller-supplied value carried by an event instead of being printed.
#[derive(Clone)]
pub struct Data {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Data {
    /// Wraps `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Borrows the value as `T` if that is its type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Reports whether the value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Name of the wrapped type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data<{}>", self.type_name)
    }
}

/// Tags `value` so that it is attached to the event rather than printed.
///
/// ```
/// use logging::{data, Arg, IntoArg};
///
/// let tagged = data("request-42");
/// assert!(matches!(IntoArg::into_arg(&tagged), Arg::Data(_)));
/// ```
pub fn data<T: Any + Send + Sync>(value: T) -> Data {
    Data::new(value)
}

/// Format string of a formatted emission, attached as the last data element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatString(pub &'static str);

/// An error attached to an event.
///
/// Keeps the error alive behind an [`Arc`] so subscribers can walk its
/// [`source`](Error::source) chain.
#[derive(Clone)]
pub struct ErrorArg {
    error: Arc<dyn Error + Send + Sync + 'static>,
}

impl ErrorArg {
    /// Wraps `error`.
    pub fn new<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self {
            error: Arc::new(error),
        }
    }

    /// The wrapped error.
    #[must_use]
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.error
    }

    /// The innermost error of the `source` chain, or the error itself.
    #[must_use]
    pub fn root_cause(&self) -> &(dyn Error + 'static) {
        let mut current: &(dyn Error + 'static) = &*self.error;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl fmt::Debug for ErrorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorArg").field(&self.error).finish()
    }
}

impl fmt::Display for ErrorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

/// A record of one emitted line.
///
/// Cloning is cheap; the message, data and backtrace are shared.
#[derive(Clone, Debug)]
pub struct Event {
    severity: Severity,
    message: Arc<[u8]>,
    data: Arc<[Data]>,
    stack_trace: Option<Arc<Backtrace>>,
    call_site: CallSite,
}

impl Event {
    /// Builds an event, capturing a backtrace for `ERROR` and `FATAL`.
    #[must_use]
    pub fn new(
        severity: Severity,
        message: impl Into<Arc<[u8]>>,
        data: Vec<Data>,
        call_site: CallSite,
    ) -> Self {
        let stack_trace = severity
            .captures_stack()
            .then(|| Arc::new(Backtrace::force_capture()));
        Self {
            severity,
            message: message.into(),
            data: data.into(),
            stack_trace,
            call_site,
        }
    }

    /// Severity of the line.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Rendered line, header included, without the trailing newline.
    #[must_use]
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// The message decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn message_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.message)
    }

    /// Tagged values in the order they were supplied.
    #[must_use]
    pub fn data(&self) -> &[Data] {
        &self.data
    }

    /// First tagged value of type `T`.
    #[must_use]
    pub fn find_data<T: Any>(&self) -> Option<&T> {
        self.data.iter().find_map(Data::downcast_ref::<T>)
    }

    /// Format string for formatted emissions.
    #[must_use]
    pub fn format_string(&self) -> Option<&'static str> {
        self.find_data::<FormatString>().map(|format| format.0)
    }

    /// Backtrace captured for `ERROR` and `FATAL` events.
    #[must_use]
    pub fn stack_trace(&self) -> Option<&Backtrace> {
        self.stack_trace.as_deref()
    }

    /// Where the line was emitted from.
    #[must_use]
    pub const fn call_site(&self) -> CallSite {
        self.call_site
    }
}
