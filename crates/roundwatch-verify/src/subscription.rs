//! Subscription contract between telemetry producers and monitors
//!
//! A producer delivers each observation to every registered subscriber and
//! interprets the returned [`SubscriberAction`]. After a subscriber returns
//! [`SubscriberAction::Unsubscribe`] the producer must never call it again.
//!
//! Subscribers are `FnMut`, so a producer has to hold exclusive access to a
//! subscriber while it runs. Deliveries to *different* subscribers may run
//! concurrently; deliveries to the same subscriber never interleave.

/// Directive returned by a subscriber after each delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberAction {
    /// Keep delivering
    Continue,
    /// Stop delivering to this subscriber
    Unsubscribe,
}

impl SubscriberAction {
    /// Whether the subscriber wants further deliveries
    pub fn is_continue(self) -> bool {
        self == SubscriberAction::Continue
    }
}

/// A registered callback for observations of type `T`.
pub type Subscriber<T> = Box<dyn FnMut(&T) -> SubscriberAction + Send + 'static>;
