//! Internal consistency of one node's consensus rounds
//!
//! Pure checks over an ordered round sequence:
//! - round numbers strictly increase
//! - the ancient threshold never decreases
//! - event creation times strictly increase within a round
//! - birth rounds respect a time/round split
//!
//! [`RoundValidator`] carries the last round of a batch over to the next one
//! so that streamed batches are validated across their boundaries.

use crate::violation::{render_round, Violation};
use roundwatch_core::{ConsensusRound, NodeId, Round, Timestamp};

/// Round number and threshold of the last validated round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RoundMark {
    round_num: Round,
    ancient_threshold: u64,
}

impl From<&ConsensusRound> for RoundMark {
    fn from(round: &ConsensusRound) -> Self {
        Self {
            round_num: round.round_num,
            ancient_threshold: round.ancient_threshold,
        }
    }
}

fn check_successor(node: NodeId, previous: RoundMark, next: &ConsensusRound) -> Vec<Violation> {
    let mut violations = Vec::new();
    if next.round_num <= previous.round_num {
        violations.push(Violation::RoundNumberRegression {
            node,
            previous: previous.round_num,
            actual: next.round_num,
        });
    }
    if next.ancient_threshold < previous.ancient_threshold {
        violations.push(Violation::AncientThresholdRegression {
            node,
            round: next.round_num,
            previous_round: previous.round_num,
            expected_min: previous.ancient_threshold,
            actual: next.ancient_threshold,
        });
    }
    violations
}

/// Check that event creation times strictly increase within `round`.
///
/// Reports the first out-of-order event only.
pub fn check_event_ordering(node: NodeId, round: &ConsensusRound) -> Result<(), Violation> {
    for (index, pair) in round.events.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.creation_time <= previous.creation_time {
            return Err(Violation::EventTimeOrdering {
                node,
                round: round.round_num,
                index: index + 1,
                event: current.to_string(),
                previous: previous.creation_time,
                actual: current.creation_time,
            });
        }
    }
    Ok(())
}

/// Check the successor relation between two adjacent rounds.
pub fn check_round_pair(
    node: NodeId,
    previous: &ConsensusRound,
    next: &ConsensusRound,
) -> Result<(), Violation> {
    match check_successor(node, RoundMark::from(previous), next)
        .into_iter()
        .next()
    {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Check a complete round history of one node.
pub fn check_rounds(node: NodeId, rounds: &[ConsensusRound]) -> Result<(), Violation> {
    let mut validator = RoundValidator::new(node);
    match validator.validate_batch(rounds).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Check that the last round of `node` is exactly `expected`.
pub fn check_last_round_num(
    node: NodeId,
    last: Option<Round>,
    expected: Round,
) -> Result<(), Violation> {
    if last == Some(expected) {
        return Ok(());
    }
    Err(Violation::LastRoundMismatch {
        node,
        expected,
        actual: render_round(last),
    })
}

/// Check that `node` has produced a round after `since`.
pub fn check_advanced_since(
    node: NodeId,
    last: Option<Round>,
    since: Round,
) -> Result<(), Violation> {
    match last {
        Some(last) if last > since => Ok(()),
        _ => Err(Violation::NotAdvanced {
            node,
            since,
            actual: render_round(last),
        }),
    }
}

/// Check that birth rounds agree with a configuration split.
///
/// Every event created at or before `split_time` must have a birth round of
/// at most `split_round`; every event created after it must have a birth
/// round above `split_round`.
pub fn check_birth_round_split(
    node: NodeId,
    rounds: &[ConsensusRound],
    split_time: Timestamp,
    split_round: Round,
) -> Result<(), Violation> {
    for round in rounds {
        for event in &round.events {
            let before_split = event.creation_time <= split_time;
            let consistent = if before_split {
                event.birth_round <= split_round
            } else {
                event.birth_round > split_round
            };
            if !consistent {
                let expected = if before_split {
                    format!("<= {split_round}")
                } else {
                    format!("> {split_round}")
                };
                return Err(Violation::BirthRoundSplit {
                    node,
                    round: round.round_num,
                    event: event.to_string(),
                    split_time,
                    split_round,
                    expected,
                    actual: event.birth_round,
                });
            }
        }
    }
    Ok(())
}

/// Incremental validator for one node's round stream.
#[derive(Debug, Clone)]
pub struct RoundValidator {
    node: NodeId,
    last: Option<RoundMark>,
}

impl RoundValidator {
    /// Create a validator that has not seen any rounds
    pub fn new(node: NodeId) -> Self {
        Self { node, last: None }
    }

    /// Node being validated
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Number of the last round seen, if any
    pub fn last_round_num(&self) -> Option<Round> {
        self.last.map(|mark| mark.round_num)
    }

    /// Validate the next batch, continuing from the previous one.
    ///
    /// Returns every violation found. The validator advances to the last
    /// round of the batch even when violations are found.
    pub fn validate_batch(&mut self, rounds: &[ConsensusRound]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for round in rounds {
            if let Some(previous) = self.last {
                violations.extend(check_successor(self.node, previous, round));
            }
            if let Err(violation) = check_event_ordering(self.node, round) {
                violations.push(violation);
            }
            self.last = Some(RoundMark::from(round));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundwatch_core::{EventDescriptor, PlatformEvent};

    fn event(generation: u64, ts_ms: u64, birth_round: Round) -> PlatformEvent {
        PlatformEvent {
            descriptor: EventDescriptor {
                creator: NodeId(0),
                generation,
                hash: [generation as u8; 32],
            },
            creation_time: Timestamp::from_millis(ts_ms),
            birth_round,
        }
    }

    fn round(round_num: Round, ancient_threshold: u64) -> ConsensusRound {
        ConsensusRound::new(round_num, ancient_threshold, vec![event(round_num, round_num * 10, round_num)])
    }

    #[test]
    fn test_monotonic_thresholds_pass() {
        let rounds = vec![round(1, 0), round(2, 0), round(3, 1)];
        assert!(check_rounds(NodeId(1), &rounds).is_ok());
    }

    #[test]
    fn test_threshold_regression_fails_at_second_round() {
        let rounds = vec![round(1, 1), round(2, 0)];
        let violation = check_rounds(NodeId(1), &rounds).unwrap_err();
        assert_eq!(
            violation,
            Violation::AncientThresholdRegression {
                node: NodeId(1),
                round: 2,
                previous_round: 1,
                expected_min: 1,
                actual: 0,
            }
        );
    }

    #[test]
    fn test_repeated_round_number_fails() {
        let rounds = vec![round(4, 0), round(4, 0)];
        let violation = check_rounds(NodeId(2), &rounds).unwrap_err();
        assert_eq!(violation.code(), "round_number_regression");
    }

    #[test]
    fn test_identical_creation_times_fail() {
        let rounds = vec![ConsensusRound::new(1, 0, vec![event(1, 50, 1), event(2, 50, 1)])];
        let violation = check_rounds(NodeId(3), &rounds).unwrap_err();
        match violation {
            Violation::EventTimeOrdering { index, round, .. } => {
                assert_eq!(index, 1);
                assert_eq!(round, 1);
            }
            other => panic!("unexpected violation {other:?}"),
        }
    }

    #[test]
    fn test_validator_carries_last_round_across_batches() {
        let mut validator = RoundValidator::new(NodeId(1));
        assert!(validator.validate_batch(&[round(1, 2), round(2, 3)]).is_empty());
        assert_eq!(validator.last_round_num(), Some(2));

        let violations = validator.validate_batch(&[round(3, 1)]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code(), "ancient_threshold_regression");

        // Compared against the regressed round from now on
        assert!(validator.validate_batch(&[round(4, 1)]).is_empty());
    }

    #[test]
    fn test_validator_reports_every_violation_in_batch() {
        let mut validator = RoundValidator::new(NodeId(1));
        let violations = validator.validate_batch(&[round(2, 5), round(1, 4)]);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_birth_round_split() {
        let split = Timestamp::from_millis(100);
        let passing = vec![ConsensusRound::new(6, 0, vec![event(1, 99, 5), event(2, 101, 6)])];
        assert!(check_birth_round_split(NodeId(1), &passing, split, 5).is_ok());

        let at_split = vec![ConsensusRound::new(6, 0, vec![event(1, 100, 5)])];
        assert!(check_birth_round_split(NodeId(1), &at_split, split, 5).is_ok());

        let failing = vec![ConsensusRound::new(6, 0, vec![event(1, 101, 5)])];
        let violation = check_birth_round_split(NodeId(1), &failing, split, 5).unwrap_err();
        match violation {
            Violation::BirthRoundSplit {
                expected, actual, ..
            } => {
                assert_eq!(expected, "> 5");
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected violation {other:?}"),
        }
    }

    #[test]
    fn test_last_round_and_progress() {
        assert!(check_last_round_num(NodeId(1), Some(7), 7).is_ok());
        let violation = check_last_round_num(NodeId(1), None, 7).unwrap_err();
        assert!(violation.to_string().contains("actual:   none"));

        assert!(check_advanced_since(NodeId(1), Some(8), 7).is_ok());
        assert!(check_advanced_since(NodeId(1), Some(7), 7).is_err());
        assert_eq!(
            check_advanced_since(NodeId(1), None, 0).unwrap_err().code(),
            "not_advanced"
        );
    }

    #[test]
    fn test_round_pair() {
        assert!(check_round_pair(NodeId(1), &round(1, 0), &round(2, 0)).is_ok());
        assert!(check_round_pair(NodeId(1), &round(2, 1), &round(3, 0)).is_err());
    }
}
