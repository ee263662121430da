//! Continuous assertion lifecycle
//!
//! A single atomic byte holds the state so that delivery threads always see
//! the latest `pause`/`resume`/`destroy` without taking a lock. The states
//! carry no other data, so no compound update is ever needed.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

const ACTIVE: u8 = 0;
const PAUSED: u8 = 1;
const DESTROYED: u8 = 2;

/// Lifecycle state of a continuous assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertionState {
    /// Observations are evaluated
    Active,
    /// Observations are accepted and ignored
    Paused,
    /// Permanently stopped; the subscription is dropped on the next delivery
    Destroyed,
}

impl AssertionState {
    fn from_u8(value: u8) -> Self {
        match value {
            ACTIVE => AssertionState::Active,
            PAUSED => AssertionState::Paused,
            _ => AssertionState::Destroyed,
        }
    }
}

impl fmt::Display for AssertionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionState::Active => f.write_str("ACTIVE"),
            AssertionState::Paused => f.write_str("PAUSED"),
            AssertionState::Destroyed => f.write_str("DESTROYED"),
        }
    }
}

/// Shared ACTIVE / PAUSED / DESTROYED flag.
///
/// `Destroyed` is terminal: `pause` and `resume` never leave it.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Create an active lifecycle
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ACTIVE),
        }
    }

    /// Current state
    pub fn state(&self) -> AssertionState {
        AssertionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Stop evaluating observations until `resume`. Returns whether the state changed.
    pub fn pause(&self) -> bool {
        self.transition(ACTIVE, PAUSED)
    }

    /// Resume evaluating observations. Returns whether the state changed.
    pub fn resume(&self) -> bool {
        self.transition(PAUSED, ACTIVE)
    }

    /// Stop permanently. Returns whether the state changed.
    pub fn destroy(&self) -> bool {
        self.state.swap(DESTROYED, Ordering::AcqRel) != DESTROYED
    }

    /// Whether observations are currently evaluated
    pub fn is_active(&self) -> bool {
        self.state() == AssertionState::Active
    }

    /// Whether the lifecycle has ended
    pub fn is_destroyed(&self) -> bool {
        self.state() == AssertionState::Destroyed
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_pause_resume() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.is_active());
        assert!(lifecycle.pause());
        assert!(!lifecycle.pause());
        assert_eq!(lifecycle.state(), AssertionState::Paused);
        assert!(lifecycle.resume());
        assert!(!lifecycle.resume());
        assert!(lifecycle.is_active());
    }

    #[test]
    fn test_destroy_is_terminal_and_idempotent() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.destroy());
        assert!(!lifecycle.destroy());
        assert!(!lifecycle.pause());
        assert!(!lifecycle.resume());
        assert_eq!(lifecycle.state(), AssertionState::Destroyed);
    }

    #[test]
    fn test_destroy_from_paused() {
        let lifecycle = Lifecycle::new();
        lifecycle.pause();
        assert!(lifecycle.destroy());
        assert!(!lifecycle.resume());
        assert!(lifecycle.is_destroyed());
    }

    #[test]
    fn test_concurrent_transitions_end_destroyed() {
        let lifecycle = Arc::new(Lifecycle::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let lifecycle = Arc::clone(&lifecycle);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        if i == 0 {
                            lifecycle.destroy();
                        } else if i % 2 == 0 {
                            lifecycle.pause();
                        } else {
                            lifecycle.resume();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(lifecycle.is_destroyed());
    }
}
