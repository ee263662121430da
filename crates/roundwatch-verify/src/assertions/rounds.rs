use super::{ensure, ResultAssert};
use crate::results::{MultiNodeConsensusRounds, NodeConsensusRounds};
use crate::rounds::{
    check_advanced_since, check_birth_round_split, check_equal_rounds, check_last_round_num,
    check_rounds,
};
use roundwatch_core::{Round, Timestamp};

impl ResultAssert<'_, dyn NodeConsensusRounds> {
    /// The last round is exactly `expected`
    #[track_caller]
    pub fn has_last_round_num(self, expected: Round) -> Self {
        let node = self.subject.node_id();
        ensure(check_last_round_num(node, self.subject.last_round_num(), expected));
        self
    }

    /// A round after `since` has been produced
    #[track_caller]
    pub fn has_advanced_since(self, since: Round) -> Self {
        let node = self.subject.node_id();
        ensure(check_advanced_since(node, self.subject.last_round_num(), since));
        self
    }

    /// Round numbers increase, thresholds never decrease and events are time ordered
    #[track_caller]
    pub fn has_consistent_rounds(self) -> Self {
        ensure(check_rounds(self.subject.node_id(), &self.subject.rounds()));
        self
    }

    /// Birth rounds respect a split at `split_time` / `split_round`
    #[track_caller]
    pub fn has_birth_round_split(self, split_time: Timestamp, split_round: Round) -> Self {
        ensure(check_birth_round_split(
            self.subject.node_id(),
            &self.subject.rounds(),
            split_time,
            split_round,
        ));
        self
    }
}

impl ResultAssert<'_, dyn MultiNodeConsensusRounds> {
    /// Every node's last round is exactly `expected`
    #[track_caller]
    pub fn have_last_round_num(self, expected: Round) -> Self {
        for result in self.subject.results() {
            ensure(check_last_round_num(result.node_id(), result.last_round_num(), expected));
        }
        self
    }

    /// Every node has produced a round after `since`
    #[track_caller]
    pub fn have_advanced_since(self, since: Round) -> Self {
        for result in self.subject.results() {
            ensure(check_advanced_since(result.node_id(), result.last_round_num(), since));
        }
        self
    }

    /// Every node's history equals the prefix of the longest history
    #[track_caller]
    pub fn have_equal_rounds(self) -> Self {
        ensure(check_equal_rounds(&self.subject.histories()));
        self
    }

    /// Every node is internally consistent and all nodes agree
    #[track_caller]
    pub fn have_consistent_rounds(self) -> Self {
        let histories = self.subject.histories();
        for (node, rounds) in &histories {
            ensure(check_rounds(*node, rounds));
        }
        ensure(check_equal_rounds(&histories));
        self
    }

    /// Every node's birth rounds respect a split at `split_time` / `split_round`
    #[track_caller]
    pub fn have_birth_round_split(self, split_time: Timestamp, split_round: Round) -> Self {
        for (node, rounds) in self.subject.histories() {
            ensure(check_birth_round_split(node, &rounds, split_time, split_round));
        }
        self
    }
}
