//! Consensus rounds and the events ordered within them

use crate::identifiers::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consensus round number
pub type Round = u64;

/// Wall-clock instant in milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl Timestamp {
    /// Create a timestamp from milliseconds
    pub const fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}

/// Identity of an event: who created it, at which generation, and its hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDescriptor {
    /// Node that created the event
    pub creator: NodeId,
    /// Generation of the event within the creator's chain
    pub generation: u64,
    /// Event hash
    pub hash: [u8; 32],
}

impl fmt::Display for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/g{}/{}",
            self.creator,
            self.generation,
            hex::encode(&self.hash[..4])
        )
    }
}

/// One event as placed into a consensus round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Event identity
    pub descriptor: EventDescriptor,
    /// Creation time claimed by the creator
    pub creation_time: Timestamp,
    /// Round in effect when the event was created
    pub birth_round: Round,
}

impl fmt::Display for PlatformEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created={} birth_round={}",
            self.descriptor, self.creation_time, self.birth_round
        )
    }
}

/// A round of consensus as reported by a single node.
///
/// Equality is structural: same round metadata and the same events in the
/// same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRound {
    /// Round number
    pub round_num: Round,
    /// Ancient threshold in effect after this round
    pub ancient_threshold: u64,
    /// Events in consensus order
    pub events: Vec<PlatformEvent>,
}

impl ConsensusRound {
    /// Create a round from its parts
    pub fn new(round_num: Round, ancient_threshold: u64, events: Vec<PlatformEvent>) -> Self {
        Self {
            round_num,
            ancient_threshold,
            events,
        }
    }

    /// Number of events in the round
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

/// A batch of rounds delivered together from one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundBatch {
    /// Node that reached consensus on these rounds
    pub node: NodeId,
    /// Rounds in delivery order
    pub rounds: Vec<ConsensusRound>,
}

impl RoundBatch {
    /// Create a batch for a node
    pub fn new(node: NodeId, rounds: Vec<ConsensusRound>) -> Self {
        Self { node, rounds }
    }
}
