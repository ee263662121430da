//! Continuous platform status checks

use super::{single, ContinuousAssert, MonitorShared, Observable};
use crate::status::{
    check_not_any_of, check_only, ProgressionMatcher, StatusProgression, StatusProgressionStep,
};
use crate::violation::Violation;
use parking_lot::Mutex;
use roundwatch_core::{NodeId, PlatformStatus, StatusObservation};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::trace;

impl<S> ContinuousAssert<S>
where
    S: ?Sized + Observable<StatusObservation>,
{
    /// Fail whenever a node enters one of `statuses`.
    pub fn do_not_enter_any_statuses_of(
        self,
        statuses: impl IntoIterator<Item = PlatformStatus>,
    ) -> Self {
        let forbidden: BTreeSet<PlatformStatus> = statuses.into_iter().collect();
        self.register("forbidden statuses", move |observation: &StatusObservation, _shared| {
            single(check_not_any_of(observation.node, observation.status, &forbidden))
        })
    }

    /// Fail whenever a node enters a status outside `statuses`.
    pub fn do_only_enter_statuses_of(
        self,
        statuses: impl IntoIterator<Item = PlatformStatus>,
    ) -> Self {
        let allowed: BTreeSet<PlatformStatus> = statuses.into_iter().collect();
        self.register("allowed statuses", move |observation: &StatusObservation, _shared| {
            single(check_only(observation.node, observation.status, &allowed))
        })
    }

    /// Match every node's status changes against `steps` as they arrive.
    ///
    /// Steps a node has not reached yet are reported by
    /// [`finish`](ContinuousAssert::finish), which also covers nodes that
    /// never reported a status.
    ///
    /// # Panics
    ///
    /// If `steps` is empty.
    #[track_caller]
    pub fn have_steps(self, steps: impl IntoIterator<Item = StatusProgressionStep>) -> Self {
        match StatusProgression::new(steps.into_iter().collect()) {
            Ok(progression) => self.have_progression(progression),
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`have_steps`](Self::have_steps) with a prebuilt progression.
    pub fn have_progression(self, progression: StatusProgression) -> Self {
        let matchers: Arc<Mutex<BTreeMap<NodeId, ProgressionMatcher>>> =
            Arc::new(Mutex::new(BTreeMap::new()));
        let expected = self.subject.observed_nodes();

        let finish_matchers = Arc::clone(&matchers);
        let finish_progression = progression.clone();
        self.on_finish("status progression", move |shared: &MonitorShared| {
            let mut matchers = finish_matchers.lock();
            let mut nodes: BTreeSet<NodeId> = expected.iter().copied().collect();
            nodes.extend(matchers.keys().copied());
            nodes
                .into_iter()
                .filter(|node| !shared.suppressions().is_node_suppressed(Some(*node)))
                .filter_map(|node| {
                    matchers
                        .entry(node)
                        .or_insert_with(|| finish_progression.matcher(node))
                        .finish()
                        .err()
                })
                .collect::<Vec<Violation>>()
        });

        self.register("status progression", move |observation: &StatusObservation, _shared| {
            let mut matchers = matchers.lock();
            let matcher = matchers
                .entry(observation.node)
                .or_insert_with(|| progression.matcher(observation.node));
            let result = matcher.observe(observation.status);
            trace!(
                node = %observation.node,
                status = %observation.status,
                matched_steps = matcher.matched_steps(),
                "progressed status matcher"
            );
            single(result)
        })
    }
}
