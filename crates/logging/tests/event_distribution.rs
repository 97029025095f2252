//! Integration tests for subscriber delivery.
//!
//! Subscribers receive each event emitted after they registered exactly
//! once, tagged data stays out of the rendered text, and errors carry a
//! backtrace.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use logging::{
    CallSite, ErrorArg, IntoArg, Logging, LoggingConfig, Severity, data,
};
use test_support::CaptureSink;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(100);
const SITE: CallSite = CallSite::new("src/app.rs", 12, 5);

fn logging(sink: &CaptureSink) -> Logging {
    Logging::builder()
        .sink(sink.clone())
        .config(LoggingConfig {
            flush_interval: None,
            ..LoggingConfig::default()
        })
        .build()
}

#[derive(Debug)]
struct DiskFull;

impl std::fmt::Display for DiskFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("disk full")
    }
}

impl std::error::Error for DiskFull {}

// ============================================================================
// Delivery
// ============================================================================

/// Each of several subscribers receives the event exactly once.
#[test]
fn every_subscriber_receives_event_once() {
    let sink = CaptureSink::new();
    let log = logging(&sink);
    let subscribers: Vec<_> = (0..4).map(|_| log.register()).collect();

    log.print_at(SITE, Severity::Info, &[IntoArg::into_arg(&"fan out")]);

    for rx in &subscribers {
        let event = rx.recv_timeout(WAIT).expect("event delivered");
        assert!(event.message_str().ends_with("app.rs:12] fan out"));
        assert!(rx.recv_timeout(QUIET).is_err(), "duplicate delivery");
    }
    assert_eq!(log.hub_stats().delivered, 4);
}

/// A subscriber registered after an emission never sees it.
#[test]
fn late_subscriber_only_sees_later_events() {
    let sink = CaptureSink::new();
    let log = logging(&sink);
    let early = log.register();

    log.print_at(SITE, Severity::Info, &[IntoArg::into_arg(&"first")]);
    let late = log.register();
    log.print_at(SITE, Severity::Info, &[IntoArg::into_arg(&"second")]);

    assert!(early.recv_timeout(WAIT).unwrap().message_str().ends_with("first"));
    assert!(early.recv_timeout(WAIT).unwrap().message_str().ends_with("second"));
    assert!(late.recv_timeout(WAIT).unwrap().message_str().ends_with("second"));
    assert!(late.recv_timeout(QUIET).is_err());
}

/// Without subscribers nothing is published.
#[test]
fn no_subscribers_means_no_events() {
    let sink = CaptureSink::new();
    let log = logging(&sink);
    log.print_at(SITE, Severity::Error, &[IntoArg::into_arg(&"unobserved")]);
    assert_eq!(log.hub_stats().published, 0);
    assert_eq!(sink.lines().len(), 1);
}

/// A subscriber that never drains loses events without slowing emitters.
#[test]
fn slow_subscriber_drops_instead_of_blocking() {
    let sink = CaptureSink::new();
    let log = Logging::builder()
        .sink(sink.clone())
        .config(LoggingConfig {
            flush_interval: None,
            subscriber_capacity: 2,
            ..LoggingConfig::default()
        })
        .build();
    let rx = log.register();

    for i in 0..50 {
        log.print_at(SITE, Severity::Info, &[IntoArg::into_arg(&i)]);
    }
    assert_eq!(sink.lines().len(), 50);

    let mut received = 0;
    while rx.recv_timeout(QUIET).is_ok() {
        received += 1;
    }
    assert!(received >= 1);
    assert!(received <= 50);
    let stats = log.hub_stats();
    assert_eq!(stats.published, 50);
}

// ============================================================================
// Event Contents
// ============================================================================

/// Tagged values are attached to the event and left out of the text.
#[test]
fn tagged_data_is_attached_not_printed() {
    let sink = CaptureSink::new();
    let log = logging(&sink);
    let rx = log.register();
    let ctx = data("ctx");

    log.print_at(
        SITE,
        Severity::Info,
        &[IntoArg::into_arg(&"hello"), IntoArg::into_arg(&ctx)],
    );

    let event = rx.recv_timeout(WAIT).expect("event");
    assert!(event.message_str().ends_with("] hello"));
    assert!(!sink.contents().contains("ctx"));
    assert_eq!(event.data().len(), 1);
    assert_eq!(event.data()[0].downcast_ref::<&str>(), Some(&"ctx"));
    assert_eq!(event.severity(), Severity::Info);
    assert_eq!(event.call_site(), SITE);
}

/// Errors carry a backtrace and an attached error keeps its cause chain.
#[test]
fn error_events_carry_stack_and_error_arg() {
    let sink = CaptureSink::new();
    let log = logging(&sink);
    let rx = log.register();
    let cause = data(ErrorArg::new(DiskFull));

    log.print_at(
        SITE,
        Severity::Error,
        &[IntoArg::into_arg(&"write failed"), IntoArg::into_arg(&cause)],
    );

    let event = rx.recv_timeout(WAIT).expect("event");
    assert!(event.stack_trace().is_some());
    let error = event.find_data::<ErrorArg>().expect("error attached");
    assert_eq!(error.root_cause().to_string(), "disk full");
}

/// Warnings do not pay for a backtrace.
#[test]
fn warning_events_have_no_stack() {
    let sink = CaptureSink::new();
    let log = logging(&sink);
    let rx = log.register();
    log.print_at(SITE, Severity::Warning, &[IntoArg::into_arg(&"careful")]);
    assert!(rx.recv_timeout(WAIT).unwrap().stack_trace().is_none());
}

// ============================================================================
// Concurrency
// ============================================================================

/// Lines from concurrent emitters never interleave.
#[test]
fn concurrent_lines_stay_whole() {
    let sink = CaptureSink::new();
    let log = Arc::new(logging(&sink));
    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let payload = format!("worker-{worker}-{}", "x".repeat(200));
                for _ in 0..100 {
                    log.print_at(SITE, Severity::Info, &[IntoArg::into_arg(&payload)]);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker thread");
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), 800);
    for line in &lines {
        let (_, body) = line.split_once("] ").expect("header present");
        assert!(body.starts_with("worker-"));
        assert!(body.ends_with(&"x".repeat(200)));
    }
    assert_eq!(log.stats().snapshot().info.lines, 800);
}
