//! crates/logging/src/hub.rs
//! Fan-out of emitted events to live subscribers.
//!
//! # Design
//!
//! Emitters never wait on subscribers. [`Hub::publish`] snapshots the current
//! subscriber list and offers the event together with that snapshot to a
//! small bounded relay queue; when the relay is full the event is dropped. A
//! single dispatcher thread, started by the first [`Hub::register`], drains
//! the relay and offers each event to every subscriber in its snapshot,
//! dropping it for subscribers whose own queue is full.
//!
//! # Invariants
//!
//! - A subscriber registered after an event was published never receives it.
//! - Each subscriber receives a given event at most once.
//! - At most one dispatcher thread exists per hub.
//! - Subscribers whose receiver was dropped are pruned by the dispatcher.

use std::sync::{Arc, Once};
use std::thread;

use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::event::Event;
use crate::stats::{HubSnapshot, HubStats};

/// Default capacity of the relay queue between emitters and the dispatcher.
pub const DEFAULT_RELAY_CAPACITY: usize = 10;

/// Default capacity of each subscriber's queue.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 100;

const DISPATCHER_THREAD_NAME: &str = "logging-dispatch";

type Subscribers = Vec<Sender<Event>>;

struct Dispatch {
    event: Event,
    targets: Arc<Subscribers>,
}

/// Event distribution hub.
pub struct Hub {
    relay_tx: Sender<Dispatch>,
    relay_rx: Receiver<Dispatch>,
    subscribers: Arc<ArcSwap<Subscribers>>,
    subscriber_capacity: usize,
    dispatcher: Once,
    stats: Arc<HubStats>,
}

impl Hub {
    /// Creates a hub. Capacities below one are raised to one.
    #[must_use]
    pub fn new(relay_capacity: usize, subscriber_capacity: usize) -> Self {
        let (relay_tx, relay_rx) = bounded(relay_capacity.max(1));
        Self {
            relay_tx,
            relay_rx,
            subscribers: Arc::new(ArcSwap::from_pointee(Vec::new())),
            subscriber_capacity: subscriber_capacity.max(1),
            dispatcher: Once::new(),
            stats: Arc::new(HubStats::default()),
        }
    }

    /// Adds a subscriber and returns its receiving end.
    ///
    /// The subscriber sees every event published after this call returns,
    /// minus any dropped because a queue was full. Dropping the receiver
    /// unsubscribes.
    pub fn register(&self) -> Receiver<Event> {
        let (tx, rx) = bounded(self.subscriber_capacity);
        self.subscribers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(tx.clone());
            next
        });
        self.start_dispatcher();
        rx
    }

    /// Reports whether any subscriber is registered.
    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.load().is_empty()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load().len()
    }

    /// Offers `event` to the current subscribers without blocking.
    pub fn publish(&self, event: Event) {
        let targets = self.subscribers.load_full();
        if targets.is_empty() {
            return;
        }
        self.stats.add_published();
        match self.relay_tx.try_send(Dispatch { event, targets }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.stats.add_relay_dropped();
                tracing::trace!("event relay full; dropping event");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.stats.add_relay_dropped();
            }
        }
    }

    /// Copies the distribution counters.
    #[must_use]
    pub fn stats(&self) -> HubSnapshot {
        self.stats.snapshot()
    }

    fn start_dispatcher(&self) {
        self.dispatcher.call_once(|| {
            let dispatcher = Dispatcher {
                relay: self.relay_rx.clone(),
                subscribers: Arc::clone(&self.subscribers),
                stats: Arc::clone(&self.stats),
            };
            let spawned = thread::Builder::new()
                .name(DISPATCHER_THREAD_NAME.to_string())
                .spawn(move || dispatcher.run());
            if let Err(e) = spawned {
                tracing::warn!(error = %e, "failed to start event dispatcher");
            }
        });
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_CAPACITY, DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("subscribers", &self.subscriber_count())
            .field("subscriber_capacity", &self.subscriber_capacity)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

struct Dispatcher {
    relay: Receiver<Dispatch>,
    subscribers: Arc<ArcSwap<Subscribers>>,
    stats: Arc<HubStats>,
}

impl Dispatcher {
    // Exits once every relay sender, i.e. the owning hub, is gone.
    fn run(self) {
        tracing::debug!("event dispatcher started");
        while let Ok(Dispatch { event, targets }) = self.relay.recv() {
            let mut closed = Vec::new();
            for subscriber in targets.iter() {
                match subscriber.try_send(event.clone()) {
                    Ok(()) => self.stats.add_delivered(),
                    Err(TrySendError::Full(_)) => self.stats.add_subscriber_dropped(),
                    Err(TrySendError::Disconnected(_)) => closed.push(subscriber.clone()),
                }
            }
            if !closed.is_empty() {
                self.prune(&closed);
            }
        }
        tracing::debug!("event relay closed; dispatcher exiting");
    }

    fn prune(&self, closed: &[Sender<Event>]) {
        let mut removed = 0;
        self.subscribers.rcu(|current| {
            let next: Subscribers = current
                .iter()
                .filter(|s| !closed.iter().any(|c| c.same_channel(s)))
                .cloned()
                .collect();
            removed = current.len() - next.len();
            next
        });
        for _ in 0..removed {
            self.stats.add_subscriber_closed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::CallSite;
    use logging_sink::Severity;
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(5);

    fn event(text: &str) -> Event {
        Event::new(
            Severity::Info,
            text.as_bytes().to_vec(),
            Vec::new(),
            CallSite::new("hub.rs", 1, 1),
        )
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let hub = Hub::default();
        hub.publish(event("nobody"));
        assert_eq!(hub.stats().published, 0);
        assert!(!hub.has_subscribers());
    }

    #[test]
    fn every_subscriber_receives_each_event_once() {
        let hub = Hub::default();
        let receivers: Vec<_> = (0..3).map(|_| hub.register()).collect();
        hub.publish(event("one"));

        for rx in &receivers {
            let received = rx.recv_timeout(WAIT).expect("event delivered");
            assert_eq!(received.message(), b"one");
            assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        }
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let hub = Hub::default();
        let early = hub.register();
        hub.publish(event("before"));
        let late = hub.register();
        hub.publish(event("after"));

        assert_eq!(early.recv_timeout(WAIT).unwrap().message(), b"before");
        assert_eq!(early.recv_timeout(WAIT).unwrap().message(), b"after");
        assert_eq!(late.recv_timeout(WAIT).unwrap().message(), b"after");
        assert!(late.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn full_subscriber_queue_drops_events() {
        let hub = Hub::new(DEFAULT_RELAY_CAPACITY, 1);
        let rx = hub.register();
        hub.publish(event("kept"));
        assert!(wait_until(|| hub.stats().delivered == 1));
        hub.publish(event("dropped"));
        assert!(wait_until(|| hub.stats().subscriber_dropped == 1));

        assert_eq!(rx.recv_timeout(WAIT).unwrap().message(), b"kept");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_relay_drops_without_blocking() {
        const BURST: u64 = 10_000;
        let hub = Hub::new(1, 1);
        let rx = hub.register();

        let started = Instant::now();
        for i in 0..BURST {
            hub.publish(event(&i.to_string()));
        }
        assert!(started.elapsed() < WAIT);

        let settled = wait_until(|| {
            let stats = hub.stats();
            stats.relay_dropped + stats.delivered + stats.subscriber_dropped == stats.published
        });
        assert!(settled);

        let stats = hub.stats();
        assert_eq!(stats.published, BURST);
        assert!(stats.relay_dropped > 0);
        assert!(stats.delivered >= 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let hub = Hub::default();
        let kept = hub.register();
        drop(hub.register());
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(event("x"));
        assert!(wait_until(|| hub.subscriber_count() == 1));
        assert_eq!(hub.stats().subscriber_closed, 1);
        assert_eq!(kept.recv_timeout(WAIT).unwrap().message(), b"x");
    }
}
