//! crates/logging/src/stats.rs
//! Counters for written lines and delivered events.

use std::sync::atomic::{AtomicU64, Ordering};

use logging_sink::Severity;

/// Lines and bytes written for one severity.
#[derive(Debug, Default)]
pub struct OutputStats {
    lines: AtomicU64,
    bytes: AtomicU64,
}

impl OutputStats {
    /// Lines written.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines.load(Ordering::Relaxed)
    }

    /// Bytes written.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    fn record(&self, bytes: u64) {
        self.lines.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OutputSnapshot {
        OutputSnapshot {
            lines: self.lines(),
            bytes: self.bytes(),
        }
    }
}

/// Point-in-time copy of [`OutputStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputSnapshot {
    /// Lines written.
    pub lines: u64,
    /// Bytes written.
    pub bytes: u64,
}

/// Output counters of one logging instance.
///
/// Counters advance under the serialization lock, in the same order as the
/// lines reach the sink. Terminating lines are not counted.
#[derive(Debug, Default)]
pub struct Stats {
    per_severity: [OutputStats; 4],
    lost_bytes: AtomicU64,
    write_failures: AtomicU64,
}

impl Stats {
    /// Counters for `severity`.
    #[must_use]
    pub fn severity(&self, severity: Severity) -> &OutputStats {
        &self.per_severity[severity.index()]
    }

    /// Bytes the sink refused.
    #[must_use]
    pub fn lost_bytes(&self) -> u64 {
        self.lost_bytes.load(Ordering::Relaxed)
    }

    /// Writes that failed.
    #[must_use]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Copies every counter.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            info: self.severity(Severity::Info).snapshot(),
            warning: self.severity(Severity::Warning).snapshot(),
            error: self.severity(Severity::Error).snapshot(),
            fatal: self.severity(Severity::Fatal).snapshot(),
            lost_bytes: self.lost_bytes(),
            write_failures: self.write_failures(),
        }
    }

    pub(crate) fn add_output(&self, severity: Severity, bytes: usize) {
        self.severity(severity).record(bytes as u64);
    }

    pub(crate) fn add_lost(&self, bytes: usize) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
        self.lost_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`Stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// `INFO` output.
    pub info: OutputSnapshot,
    /// `WARNING` output.
    pub warning: OutputSnapshot,
    /// `ERROR` output.
    pub error: OutputSnapshot,
    /// `FATAL` output.
    pub fatal: OutputSnapshot,
    /// Bytes the sink refused.
    pub lost_bytes: u64,
    /// Writes that failed.
    pub write_failures: u64,
}

/// Event distribution counters.
#[derive(Debug, Default)]
pub struct HubStats {
    published: AtomicU64,
    relay_dropped: AtomicU64,
    delivered: AtomicU64,
    subscriber_dropped: AtomicU64,
    subscriber_closed: AtomicU64,
}

impl HubStats {
    pub(crate) fn add_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_relay_dropped(&self) {
        self.relay_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_subscriber_dropped(&self) {
        self.subscriber_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_subscriber_closed(&self) {
        self.subscriber_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies every counter.
    #[must_use]
    pub fn snapshot(&self) -> HubSnapshot {
        HubSnapshot {
            published: self.published.load(Ordering::Relaxed),
            relay_dropped: self.relay_dropped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            subscriber_dropped: self.subscriber_dropped.load(Ordering::Relaxed),
            subscriber_closed: self.subscriber_closed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`HubStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HubSnapshot {
    /// Events offered to the relay while subscribers existed.
    pub published: u64,
    /// Events dropped because the relay was full.
    pub relay_dropped: u64,
    /// Per-subscriber deliveries.
    pub delivered: u64,
    /// Per-subscriber drops because that subscriber's queue was full.
    pub subscriber_dropped: u64,
    /// Subscribers removed after their receiver was dropped.
    pub subscriber_closed: u64,
}
