//! crates/logging/src/tracing_bridge.rs
//! Bridge from the `tracing` crate into a [`Logging`] instance.
//!
//! [`LoggingLayer`] is a `tracing-subscriber` layer that renders `tracing`
//! events as log lines. Levels map as follows:
//!
//! | tracing | emitted as |
//! |---------|------------|
//! | `ERROR` | `ERROR` |
//! | `WARN`  | `WARNING` |
//! | `INFO`  | `INFO` |
//! | `DEBUG` | `INFO`, gated on V-level 1 |
//! | `TRACE` | `INFO`, gated on V-level 2 |
//!
//! The `message` field becomes the body; every other field is attached to
//! the event as a [`TracingField`]. Events whose target is this crate are
//! ignored so the crate's own diagnostics never loop back into it.
//!
//! # Usage
//!
//! ```rust,ignore
//! logging::init_tracing().expect("no other subscriber installed");
//! tracing::debug!(shard = 3, "rebalancing");
//! ```

use tracing::{Level as TracingLevel, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;

use logging_sink::Severity;

use crate::arg::Arg;
use crate::event::Data;
use crate::global::global;
use crate::levels::{CallSite, Level};
use crate::pipeline::Logging;

const OWN_TARGET: &str = "logging";

/// A non-message field of a bridged `tracing` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingField {
    /// Field name.
    pub name: &'static str,
    /// Field value, rendered with `Debug` unless recorded as a string.
    pub value: String,
}

/// A tracing layer forwarding events to a [`Logging`] instance.
#[derive(Clone, Copy, Debug)]
pub struct LoggingLayer {
    logging: &'static Logging,
}

impl LoggingLayer {
    /// Creates a layer writing to `logging`.
    #[must_use]
    pub const fn new(logging: &'static Logging) -> Self {
        Self { logging }
    }

    /// Creates a layer writing to the process-wide instance.
    #[must_use]
    pub fn global() -> Self {
        Self::new(global())
    }

    /// Map a tracing level to a severity and the V-level gating it.
    const fn map_level(level: &TracingLevel) -> (Severity, Option<Level>) {
        match *level {
            TracingLevel::ERROR => (Severity::Error, None),
            TracingLevel::WARN => (Severity::Warning, None),
            TracingLevel::INFO => (Severity::Info, None),
            TracingLevel::DEBUG => (Severity::Info, Some(Level(1))),
            TracingLevel::TRACE => (Severity::Info, Some(Level(2))),
        }
    }

    fn is_own_target(target: &str) -> bool {
        target == OWN_TARGET
            || target
                .strip_prefix(OWN_TARGET)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl<S> Layer<S> for LoggingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if Self::is_own_target(metadata.target()) {
            return;
        }
        let site = CallSite::new(
            metadata.file().unwrap_or("<unknown>"),
            metadata.line().unwrap_or(0),
            0,
        );
        let (severity, gate) = Self::map_level(metadata.level());
        if let Some(level) = gate {
            if !self.logging.enabled(site, level) {
                return;
            }
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let message = visitor.message.unwrap_or_default();
        let mut args = Vec::with_capacity(1 + visitor.fields.len());
        args.push(Arg::Text(&message));
        args.extend(visitor.fields.into_iter().map(|f| Arg::Data(Data::new(f))));
        self.logging.print_at(site, severity, &args);
    }
}

/// Collects the message and remaining fields of an event.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<TracingField>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push(TracingField {
                name: field.name(),
                value,
            });
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.fields.push(TracingField {
                name: field.name(),
                value: value.to_owned(),
            });
        }
    }
}

/// Installs a global `tracing` subscriber forwarding to the process-wide
/// logging instance.
///
/// # Errors
///
/// Fails if another global `tracing` subscriber is already installed.
pub fn init_tracing() -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(LoggingLayer::global())
        .try_init()
}
