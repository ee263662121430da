//! Cross-node agreement on consensus rounds
//!
//! The node with the longest history is the reference. Every other node's
//! history must equal the reference's prefix of the same length; a node with
//! no rounds agrees trivially.

use super::diff::diff_rounds;
use crate::violation::Violation;
use roundwatch_core::{ConsensusRound, NodeId, Round};
use std::collections::BTreeMap;

/// Pick the node with the most rounds; ties go to the lowest node id.
pub fn select_reference(histories: &BTreeMap<NodeId, Vec<ConsensusRound>>) -> Option<NodeId> {
    let mut best: Option<(NodeId, usize)> = None;
    for (node, rounds) in histories {
        match best {
            Some((_, len)) if rounds.len() <= len => {}
            _ => best = Some((*node, rounds.len())),
        }
    }
    best.map(|(node, _)| node)
}

/// Compare one node's history against the reference's prefix.
pub fn check_against_reference(
    reference: NodeId,
    reference_rounds: &[ConsensusRound],
    node: NodeId,
    rounds: &[ConsensusRound],
) -> Result<(), Violation> {
    for (expected, actual) in reference_rounds.iter().zip(rounds) {
        if let Some(diff) = diff_rounds(expected, actual) {
            return Err(Violation::RoundMismatch {
                reference,
                node,
                round: expected.round_num,
                diff,
            });
        }
    }
    Ok(())
}

/// Check that every node agrees with the reference node.
pub fn check_equal_rounds(
    histories: &BTreeMap<NodeId, Vec<ConsensusRound>>,
) -> Result<(), Violation> {
    let Some(reference) = select_reference(histories) else {
        return Ok(());
    };
    let reference_rounds = &histories[&reference];
    for (node, rounds) in histories {
        if *node == reference {
            continue;
        }
        check_against_reference(reference, reference_rounds, *node, rounds)?;
    }
    Ok(())
}

/// Streaming agreement check.
///
/// The first node to report a round number becomes the reference for that
/// round; every later report of the same round number from another node is
/// compared against it.
#[derive(Debug, Default)]
pub struct RoundAgreement {
    first_seen: BTreeMap<Round, (NodeId, ConsensusRound)>,
}

impl RoundAgreement {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct rounds seen so far
    pub fn tracked_rounds(&self) -> usize {
        self.first_seen.len()
    }

    /// Record a round reported by `node`, comparing it with earlier reports.
    pub fn observe(&mut self, node: NodeId, round: &ConsensusRound) -> Result<(), Violation> {
        match self.first_seen.get(&round.round_num) {
            None => {
                self.first_seen
                    .insert(round.round_num, (node, round.clone()));
                Ok(())
            }
            Some((reference, _)) if *reference == node => Ok(()),
            Some((reference, expected)) => match diff_rounds(expected, round) {
                None => Ok(()),
                Some(diff) => Err(Violation::RoundMismatch {
                    reference: *reference,
                    node,
                    round: round.round_num,
                    diff,
                }),
            },
        }
    }

    /// Forget rounds below `round`
    pub fn prune_below(&mut self, round: Round) {
        self.first_seen = self.first_seen.split_off(&round);
    }
}
