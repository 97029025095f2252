//! Integration tests for forwarding `tracing` events.

#![cfg(feature = "tracing")]

use std::time::Duration;

use logging::{IntoArg, Logging, LoggingConfig, LoggingLayer, Severity, TracingField};
use test_support::CaptureSink;
use tracing_subscriber::layer::SubscriberExt;

fn leaked_logging(sink: &CaptureSink, verbosity: i32) -> &'static Logging {
    let log = Logging::builder()
        .sink(sink.clone())
        .config(LoggingConfig {
            flush_interval: None,
            verbosity: verbosity.into(),
            ..LoggingConfig::default()
        })
        .build();
    Box::leak(Box::new(log))
}

#[test]
fn tracing_levels_map_to_severities() {
    let sink = CaptureSink::new();
    let log = leaked_logging(&sink, 0);
    let subscriber = tracing_subscriber::registry().with(LoggingLayer::new(log));

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(target: "app", "bridge-error");
        tracing::warn!(target: "app", "bridge-warn");
        tracing::info!(target: "app", "bridge-info");
        tracing::debug!(target: "app", "bridge-debug");
    });

    let lines = sink.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with('E') && lines[0].ends_with("] bridge-error"));
    assert!(lines[1].starts_with('W') && lines[1].ends_with("] bridge-warn"));
    assert!(lines[2].starts_with('I') && lines[2].ends_with("] bridge-info"));
}

#[test]
fn debug_and_trace_follow_verbosity() {
    let sink = CaptureSink::new();
    let log = leaked_logging(&sink, 1);
    let subscriber = tracing_subscriber::registry().with(LoggingLayer::new(log));

    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!(target: "app", "bridge-v1");
        tracing::trace!(target: "app", "bridge-v2");
    });

    let contents = sink.contents();
    assert!(contents.contains("] bridge-v1"));
    assert!(!contents.contains("bridge-v2"));
}

#[test]
fn fields_become_event_data() {
    let sink = CaptureSink::new();
    let log = leaked_logging(&sink, 0);
    let rx = log.register();
    let subscriber = tracing_subscriber::registry().with(LoggingLayer::new(log));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(target: "app", shard = 3, owner = "ops", "rebalanced");
    });

    let event = rx.recv_timeout(Duration::from_secs(5)).expect("event");
    assert_eq!(event.severity(), Severity::Info);
    assert!(event.message_str().ends_with("] rebalanced"));
    let fields: Vec<&TracingField> = event
        .data()
        .iter()
        .filter_map(|d| d.downcast_ref::<TracingField>())
        .collect();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "shard");
    assert_eq!(fields[0].value, "3");
    assert_eq!(fields[1].value, "ops");
}

#[test]
fn own_diagnostics_are_not_forwarded() {
    let sink = CaptureSink::new();
    let log = leaked_logging(&sink, 0);
    let subscriber = tracing_subscriber::registry().with(LoggingLayer::new(log));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(target: "logging::hub", "internal");
        log.info(&[IntoArg::into_arg(&"direct")]);
    });

    assert_eq!(sink.lines().len(), 1);
    assert!(sink.contents().contains("] direct"));
}
