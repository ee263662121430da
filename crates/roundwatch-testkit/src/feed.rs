//! In-memory subscription feed
//!
//! Delivers observations to registered subscribers on the publishing thread.
//! Several threads may publish at once; each subscriber sits behind its own
//! mutex so that deliveries to one subscriber never interleave, while
//! different subscribers run in parallel. A subscriber that returns
//! `Unsubscribe` is dropped and never called again.

use parking_lot::{Mutex, RwLock};
use roundwatch_verify::{Subscriber, SubscriberAction};
use std::fmt;
use std::sync::Arc;

type Slot<T> = Arc<Mutex<Option<Subscriber<T>>>>;

/// Multi-producer feed of observations of type `T`.
pub struct Feed<T> {
    slots: RwLock<Vec<Slot<T>>>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Feed<T> {
    /// Create a feed without subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for later observations
    pub fn subscribe(&self, subscriber: Subscriber<T>) {
        self.slots.write().push(Arc::new(Mutex::new(Some(subscriber))));
    }

    /// Deliver `observation` to every live subscriber.
    ///
    /// Returns the number of subscribers that were called.
    pub fn publish(&self, observation: &T) -> usize {
        let slots: Vec<Slot<T>> = self.slots.read().iter().map(Arc::clone).collect();
        let mut delivered = 0;
        let mut dropped = false;
        for slot in &slots {
            let mut guard = slot.lock();
            let Some(subscriber) = guard.as_mut() else {
                continue;
            };
            delivered += 1;
            if subscriber(observation) == SubscriberAction::Unsubscribe {
                *guard = None;
                dropped = true;
            }
        }
        if dropped {
            self.slots.write().retain(|slot| slot.lock().is_some());
        }
        delivered
    }

    /// Number of subscribers still receiving observations
    pub fn subscriber_count(&self) -> usize {
        self.slots
            .read()
            .iter()
            .filter(|slot| slot.lock().is_some())
            .count()
    }
}

impl<T> fmt::Debug for Feed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unsubscribe_is_honored() {
        let feed = Feed::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        feed.subscribe(Box::new(move |value: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            if *value >= 2 {
                SubscriberAction::Unsubscribe
            } else {
                SubscriberAction::Continue
            }
        }));

        for value in 0..5 {
            feed.publish(&value);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(feed.subscriber_count(), 0);
        assert_eq!(feed.publish(&9), 0);
    }

    #[test]
    fn test_concurrent_publishers_never_interleave_one_subscriber() {
        let feed = Arc::new(Feed::<u64>::new());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let total = Arc::new(AtomicUsize::new(0));
        {
            let in_flight = Arc::clone(&in_flight);
            let total = Arc::clone(&total);
            feed.subscribe(Box::new(move |_: &u64| {
                assert_eq!(in_flight.fetch_add(1, Ordering::SeqCst), 0);
                total.fetch_add(1, Ordering::SeqCst);
                in_flight.fetch_sub(1, Ordering::SeqCst);
                SubscriberAction::Continue
            }));
        }

        let producers: Vec<_> = (0..4u64)
            .map(|producer| {
                let feed = Arc::clone(&feed);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        feed.publish(&(producer * 1000 + i));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        assert_eq!(total.load(Ordering::SeqCst), 1000);
    }
}
