//! Property test strategies for roundwatch types
//!
//! Histories are generated valid by construction; tests that need an
//! invalid input derive it from a valid one so that the failure position
//! is known.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use crate::factories::event_hash;
use roundwatch_core::{
    ConsensusRound, EventDescriptor, LogLevel, NodeId, PlatformEvent, PlatformStatus, Round,
    Timestamp,
};
use roundwatch_verify::status::StatusProgressionStep;
use std::collections::BTreeSet;

/// Strategy for node identifiers in 0..64
pub fn arb_node_id() -> impl Strategy<Value = NodeId> {
    (0u64..64).prop_map(NodeId)
}

/// Strategy for any platform status
pub fn arb_platform_status() -> impl Strategy<Value = PlatformStatus> {
    prop::sample::select(PlatformStatus::ALL.to_vec())
}

/// Strategy for any log level
pub fn arb_log_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(vec![
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ])
}

fn ordered_events(round_num: Round, gaps: Vec<u64>) -> Vec<PlatformEvent> {
    let mut created_ms = round_num * 10_000;
    gaps.into_iter()
        .enumerate()
        .map(|(index, gap)| {
            created_ms += gap;
            let creator = NodeId(index as u64);
            PlatformEvent {
                descriptor: EventDescriptor {
                    creator,
                    generation: round_num,
                    hash: event_hash(creator, round_num, 0),
                },
                creation_time: Timestamp::from_millis(created_ms),
                birth_round: round_num,
            }
        })
        .collect()
}

/// Strategy for an internally consistent history of 1..`max_rounds` rounds.
///
/// Round numbers increase by random steps, ancient thresholds never
/// decrease, and event creation times increase within every round.
pub fn arb_consistent_history(max_rounds: usize) -> impl Strategy<Value = Vec<ConsensusRound>> {
    let round = (1u64..4, 0u64..3, prop::collection::vec(1u64..50, 0..5));
    prop::collection::vec(round, 1..max_rounds.max(2)).prop_map(|steps| {
        let mut round_num = 0;
        let mut threshold = 0;
        steps
            .into_iter()
            .map(|(round_step, threshold_step, gaps)| {
                round_num += round_step;
                threshold += threshold_step;
                ConsensusRound::new(round_num, threshold, ordered_events(round_num, gaps))
            })
            .collect()
    })
}

/// Strategy for a consistent history plus an index of a round other than
/// the first, used to inject a regression at a known position
pub fn arb_history_with_position(
    max_rounds: usize,
) -> impl Strategy<Value = (Vec<ConsensusRound>, usize)> {
    arb_consistent_history(max_rounds)
        .prop_filter("needs two rounds", |rounds| rounds.len() >= 2)
        .prop_flat_map(|rounds| {
            let len = rounds.len();
            (Just(rounds), 1..len)
        })
}

/// Strategy for status progressions together with a status sequence that follows them.
///
/// Interim statuses never include the target of their step, and the
/// sequence visits every required interim status before each target.
pub fn arb_progression_story(
) -> impl Strategy<Value = (Vec<StatusProgressionStep>, Vec<PlatformStatus>)> {
    let step = (
        arb_platform_status(),
        prop::collection::btree_set(arb_platform_status(), 0..3),
        prop::collection::btree_set(arb_platform_status(), 0..3),
        any::<u8>(),
    );
    prop::collection::vec(step, 1..5).prop_map(|raw_steps| {
        let mut steps = Vec::new();
        let mut statuses = Vec::new();
        for (target, required, optional, mask) in raw_steps {
            let required: BTreeSet<PlatformStatus> =
                required.into_iter().filter(|status| *status != target).collect();
            let optional: BTreeSet<PlatformStatus> = optional
                .into_iter()
                .filter(|status| *status != target && !required.contains(status))
                .collect();
            for (bit, status) in optional.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    statuses.push(*status);
                }
            }
            statuses.extend(required.iter().copied());
            statuses.push(target);
            steps.push(
                StatusProgressionStep::new(target)
                    .requiring_interim(required)
                    .optional_interim(optional),
            );
        }
        (steps, statuses)
    })
}
