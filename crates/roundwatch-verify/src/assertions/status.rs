use super::{ensure, ResultAssert};
use crate::results::{MultiNodePlatformStatus, NodePlatformStatus};
use crate::status::{check_not_any_of, check_only, StatusProgression, StatusProgressionStep};
use roundwatch_core::{NodeId, PlatformStatus};
use std::collections::BTreeSet;

#[track_caller]
fn progression(steps: impl IntoIterator<Item = StatusProgressionStep>) -> StatusProgression {
    match StatusProgression::new(steps.into_iter().collect()) {
        Ok(progression) => progression,
        Err(err) => panic!("{err}"),
    }
}

#[track_caller]
fn never_entered(node: NodeId, statuses: &[PlatformStatus], forbidden: &BTreeSet<PlatformStatus>) {
    for status in statuses {
        ensure(check_not_any_of(node, *status, forbidden));
    }
}

#[track_caller]
fn only_entered(node: NodeId, statuses: &[PlatformStatus], allowed: &BTreeSet<PlatformStatus>) {
    for status in statuses {
        ensure(check_only(node, *status, allowed));
    }
}

impl ResultAssert<'_, dyn NodePlatformStatus> {
    /// The status history follows `steps` exactly
    ///
    /// # Panics
    ///
    /// Also if `steps` is empty.
    #[track_caller]
    pub fn has_steps(self, steps: impl IntoIterator<Item = StatusProgressionStep>) -> Self {
        let progression = progression(steps);
        ensure(progression.check(self.subject.node_id(), &self.subject.statuses()));
        self
    }

    /// None of `statuses` was ever entered
    #[track_caller]
    pub fn does_not_have_any_of(self, statuses: impl IntoIterator<Item = PlatformStatus>) -> Self {
        let forbidden: BTreeSet<PlatformStatus> = statuses.into_iter().collect();
        never_entered(self.subject.node_id(), &self.subject.statuses(), &forbidden);
        self
    }

    /// Only `statuses` were ever entered
    #[track_caller]
    pub fn has_only_statuses_of(self, statuses: impl IntoIterator<Item = PlatformStatus>) -> Self {
        let allowed: BTreeSet<PlatformStatus> = statuses.into_iter().collect();
        only_entered(self.subject.node_id(), &self.subject.statuses(), &allowed);
        self
    }
}

impl ResultAssert<'_, dyn MultiNodePlatformStatus> {
    /// Every node's status history follows `steps` exactly
    ///
    /// # Panics
    ///
    /// Also if `steps` is empty.
    #[track_caller]
    pub fn have_steps(self, steps: impl IntoIterator<Item = StatusProgressionStep>) -> Self {
        let progression = progression(steps);
        for result in self.subject.results() {
            ensure(progression.check(result.node_id(), &result.statuses()));
        }
        self
    }

    /// No node ever entered one of `statuses`
    #[track_caller]
    pub fn do_not_have_any_of(self, statuses: impl IntoIterator<Item = PlatformStatus>) -> Self {
        let forbidden: BTreeSet<PlatformStatus> = statuses.into_iter().collect();
        for result in self.subject.results() {
            never_entered(result.node_id(), &result.statuses(), &forbidden);
        }
        self
    }

    /// Every node only entered `statuses`
    #[track_caller]
    pub fn have_only_statuses_of(self, statuses: impl IntoIterator<Item = PlatformStatus>) -> Self {
        let allowed: BTreeSet<PlatformStatus> = statuses.into_iter().collect();
        for result in self.subject.results() {
            only_entered(result.node_id(), &result.statuses(), &allowed);
        }
        self
    }
}
