//! Test data factories
//!
//! Deterministic events and round histories. Event hashes are SHA-256 over
//! the creator, generation and a salt, so two factories with the same inputs
//! produce identical rounds and a different salt produces a divergent one.

use roundwatch_core::{ConsensusRound, EventDescriptor, NodeId, PlatformEvent, Round, Timestamp};
use sha2::{Digest, Sha256};

/// Deterministic 32-byte hash for an event
pub fn event_hash(creator: NodeId, generation: u64, salt: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(creator.0.to_be_bytes());
    hasher.update(generation.to_be_bytes());
    hasher.update(salt.to_be_bytes());
    hasher.finalize().into()
}

/// Event with a deterministic hash
pub fn event(
    creator: NodeId,
    generation: u64,
    created_ms: u64,
    birth_round: Round,
) -> PlatformEvent {
    PlatformEvent {
        descriptor: EventDescriptor {
            creator,
            generation,
            hash: event_hash(creator, generation, 0),
        },
        creation_time: Timestamp::from_millis(created_ms),
        birth_round,
    }
}

/// Builder for a linear, internally consistent round history.
///
/// Round `n` holds `events_per_round` events created at strictly
/// increasing times, born in round `n`. The ancient threshold trails the
/// round number by `ancient_lag` and never decreases.
#[derive(Debug, Clone)]
pub struct RoundHistoryFactory {
    first_round: Round,
    events_per_round: usize,
    ancient_lag: u64,
    round_duration_ms: u64,
    salt: u64,
}

impl Default for RoundHistoryFactory {
    fn default() -> Self {
        Self {
            first_round: 1,
            events_per_round: 3,
            ancient_lag: 2,
            round_duration_ms: 100,
            salt: 0,
        }
    }
}

impl RoundHistoryFactory {
    /// Factory with the default shape
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the first round
    pub fn starting_at(mut self, first_round: Round) -> Self {
        self.first_round = first_round;
        self
    }

    /// Events in every round
    pub fn with_events_per_round(mut self, events_per_round: usize) -> Self {
        self.events_per_round = events_per_round;
        self
    }

    /// Distance between round number and ancient threshold
    pub fn with_ancient_lag(mut self, ancient_lag: u64) -> Self {
        self.ancient_lag = ancient_lag;
        self
    }

    /// Hash salt; different salts produce different event hashes
    pub fn with_salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    /// Round `round_num` of the history
    pub fn round(&self, round_num: Round) -> ConsensusRound {
        let start_ms = round_num * self.round_duration_ms;
        let step_ms = (self.round_duration_ms / (self.events_per_round as u64 + 1)).max(1);
        let events = (0..self.events_per_round as u64)
            .map(|index| {
                let creator = NodeId(index);
                let generation = round_num;
                PlatformEvent {
                    descriptor: EventDescriptor {
                        creator,
                        generation,
                        hash: event_hash(creator, generation, self.salt),
                    },
                    creation_time: Timestamp::from_millis(start_ms + index * step_ms),
                    birth_round: round_num,
                }
            })
            .collect();
        ConsensusRound::new(
            round_num,
            round_num.saturating_sub(self.ancient_lag),
            events,
        )
    }

    /// The first `count` rounds
    pub fn build(&self, count: usize) -> Vec<ConsensusRound> {
        (0..count as u64)
            .map(|offset| self.round(self.first_round + offset))
            .collect()
    }
}

/// Copy of `round` whose first event has a different hash
pub fn diverge(round: &ConsensusRound) -> ConsensusRound {
    let mut diverged = round.clone();
    if let Some(event) = diverged.events.first_mut() {
        event.descriptor.hash[0] ^= 0xff;
    }
    diverged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_deterministic_and_salted() {
        let factory = RoundHistoryFactory::new();
        assert_eq!(factory.build(4), factory.build(4));
        assert_ne!(factory.round(2), factory.clone().with_salt(7).round(2));
    }

    #[test]
    fn test_history_shape() {
        let rounds = RoundHistoryFactory::new().starting_at(5).build(3);
        let numbers: Vec<Round> = rounds.iter().map(|round| round.round_num).collect();
        assert_eq!(numbers, vec![5, 6, 7]);
        assert!(rounds
            .windows(2)
            .all(|pair| pair[0].ancient_threshold <= pair[1].ancient_threshold));
        for round in &rounds {
            assert!(round
                .events
                .windows(2)
                .all(|pair| pair[0].creation_time < pair[1].creation_time));
        }
    }

    #[test]
    fn test_diverge_changes_only_hash() {
        let round = RoundHistoryFactory::new().round(3);
        let diverged = diverge(&round);
        assert_ne!(round, diverged);
        assert_eq!(round.event_count(), diverged.event_count());
    }
}
