//! Continuous consensus round checks

use super::{ContinuousAssert, Observable};
use crate::rounds::{RoundAgreement, RoundValidator};
use crate::violation::Violation;
use roundwatch_core::{NodeId, RoundBatch};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Agreement state fed by batches from every node.
///
/// Rounds every expected node has already passed can no longer be compared
/// against anything new, so they are pruned. Independently of that, only the
/// last `window` round numbers below the highest round seen are kept, so a
/// silent or suppressed node cannot hold rounds forever.
struct AgreementTracker {
    agreement: RoundAgreement,
    expected: BTreeSet<NodeId>,
    last_seen: BTreeMap<NodeId, u64>,
    highest: Option<u64>,
    window: u64,
}

impl AgreementTracker {
    /// Tracker for `expected`, or `None` when there is nothing to compare.
    fn for_nodes(expected: Vec<NodeId>, window: u64) -> Option<Self> {
        if expected.len() < 2 {
            debug!(nodes = expected.len(), "skipping round agreement for fewer than two nodes");
            return None;
        }
        Some(Self {
            agreement: RoundAgreement::new(),
            expected: expected.into_iter().collect(),
            last_seen: BTreeMap::new(),
            highest: None,
            window: window.max(1),
        })
    }

    fn observe(&mut self, batch: &RoundBatch) -> Vec<Violation> {
        let mut violations = Vec::new();
        for round in &batch.rounds {
            if let Err(violation) = self.agreement.observe(batch.node, round) {
                violations.push(violation);
            }
            self.highest = Some(self.highest.map_or(round.round_num, |h| h.max(round.round_num)));
        }
        if let Some(last) = batch.rounds.last() {
            self.last_seen.insert(batch.node, last.round_num);
            self.prune();
        }
        violations
    }

    /// Lowest last round among expected nodes, once all of them have reported
    fn passed_by_all(&self) -> Option<u64> {
        self.expected
            .iter()
            .map(|node| self.last_seen.get(node).copied())
            .collect::<Option<Vec<u64>>>()?
            .into_iter()
            .min()
    }

    fn prune(&mut self) {
        let window_floor = self
            .highest
            .map_or(0, |highest| highest.saturating_add(1).saturating_sub(self.window));
        let floor = self.passed_by_all().unwrap_or(0).max(window_floor);
        if floor == 0 {
            return;
        }
        self.agreement.prune_below(floor);
        trace!(below = floor, tracked = self.agreement.tracked_rounds(), "pruned agreement");
    }
}

impl<S> ContinuousAssert<S>
where
    S: ?Sized + Observable<RoundBatch>,
{
    /// Validate each node's rounds as they arrive and compare nodes against each other.
    ///
    /// The last round of a batch is carried over so that the boundary to the
    /// next batch of the same node is validated too. Results with a single
    /// node are only validated.
    pub fn have_consistent_rounds(self) -> Self {
        let mut validators: BTreeMap<NodeId, RoundValidator> = BTreeMap::new();
        let mut tracker = AgreementTracker::for_nodes(
            self.subject.observed_nodes(),
            self.config().agreement_window_rounds,
        );
        self.register("consistent rounds", move |batch: &RoundBatch, _shared| {
            let validator = validators
                .entry(batch.node)
                .or_insert_with(|| RoundValidator::new(batch.node));
            let mut violations = validator.validate_batch(&batch.rounds);
            if let Some(tracker) = tracker.as_mut() {
                violations.extend(tracker.observe(batch));
            }
            trace!(
                node = %batch.node,
                rounds = batch.rounds.len(),
                last_round = ?validator.last_round_num(),
                "validated round batch"
            );
            violations
        })
    }

    /// Compare the rounds of every node against the first report of each round number.
    ///
    /// Registers nothing when the result has fewer than two nodes.
    pub fn have_equal_rounds(self) -> Self {
        let Some(mut tracker) = AgreementTracker::for_nodes(
            self.subject.observed_nodes(),
            self.config().agreement_window_rounds,
        ) else {
            return self;
        };
        self.register("equal rounds", move |batch: &RoundBatch, _shared| {
            tracker.observe(batch)
        })
    }
}
