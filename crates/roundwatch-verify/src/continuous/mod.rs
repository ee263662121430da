//! Continuous assertions
//!
//! A continuous assertion subscribes one or more checks to a result and
//! evaluates every observation as it is delivered, on the delivering thread.
//! All checks registered through one [`ContinuousAssert`] share a single
//! lifecycle, one pair of suppression registries and one violation handler.
//!
//! - **lifecycle**: ACTIVE / PAUSED / DESTROYED flag
//! - **suppression**: ignored nodes and log markers
//! - **handler**: where violations go
//! - **source**: results that can be subscribed to
//! - **rounds**, **status**, **reconnect**, **markers**, **logs**: check registration

pub mod handler;
pub mod lifecycle;
pub mod source;
pub mod suppression;

mod logs;
mod markers;
mod reconnect;
mod rounds;
mod status;

pub use handler::{CollectingHandler, MonitorContext, PanickingHandler, ViolationHandler};
pub use lifecycle::{AssertionState, Lifecycle};
pub use source::{Observable, Observation};
pub use suppression::{SuppressionRegistry, Suppressions};

use crate::subscription::{Subscriber, SubscriberAction};
use crate::violation::Violation;
use parking_lot::Mutex;
use roundwatch_core::{MonitorConfig, NodeId, ViolationPolicy};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// End-of-input check run by [`ContinuousAssert::finish`].
type Finisher = Box<dyn Fn(&MonitorShared) -> Vec<Violation> + Send + Sync>;

/// State shared by every check of one continuous assertion.
pub(crate) struct MonitorShared {
    lifecycle: Lifecycle,
    suppressions: Suppressions,
    context: MonitorContext,
    finishers: Mutex<Vec<(&'static str, Finisher)>>,
}

impl MonitorShared {
    fn new(context: MonitorContext) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            suppressions: Suppressions::new(),
            context,
            finishers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn config(&self) -> &MonitorConfig {
        self.context.config()
    }

    pub(crate) fn suppressions(&self) -> &Suppressions {
        &self.suppressions
    }

    /// Hand `violation` to the handler and apply the violation policy.
    fn report(&self, assertion: &str, violation: &Violation) {
        warn!(
            assertion,
            code = violation.code(),
            node = ?violation.node(),
            "continuous assertion violated"
        );
        self.context.handler().on_violation(assertion, violation);
        if self.config().violation_policy == ViolationPolicy::DestroyOnViolation
            && self.lifecycle.destroy()
        {
            debug!(assertion, "destroyed after violation");
        }
    }

    /// Report `violations` in order until the assertion is destroyed.
    /// Returns the violations that were reported.
    fn report_all(&self, assertion: &str, violations: Vec<Violation>) -> Vec<Violation> {
        let mut reported = Vec::with_capacity(violations.len());
        for violation in violations {
            if self.lifecycle.is_destroyed() {
                break;
            }
            self.report(assertion, &violation);
            reported.push(violation);
        }
        reported
    }
}

impl fmt::Debug for MonitorShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorShared")
            .field("state", &self.lifecycle.state())
            .field("suppressions", &self.suppressions)
            .field("context", &self.context)
            .field("finishers", &self.finishers.lock().len())
            .finish()
    }
}

/// Wrap `check` into a subscriber obeying the lifecycle and node suppression.
///
/// The returned subscriber unsubscribes on the first delivery after the
/// assertion is destroyed, ignores deliveries while paused, and skips
/// observations from suppressed nodes.
fn monitor<T, F>(shared: &Arc<MonitorShared>, assertion: &'static str, mut check: F) -> Subscriber<T>
where
    T: Observation,
    F: FnMut(&T, &MonitorShared) -> Vec<Violation> + Send + 'static,
{
    let shared = Arc::clone(shared);
    Box::new(move |observation: &T| {
        match shared.lifecycle.state() {
            AssertionState::Destroyed => return SubscriberAction::Unsubscribe,
            AssertionState::Paused => return SubscriberAction::Continue,
            AssertionState::Active => {}
        }

        let node = observation.source_node();
        if shared.suppressions.is_node_suppressed(node) {
            trace!(assertion, node = ?node, "skipping suppressed node");
        } else {
            trace!(assertion, node = ?node, "evaluating observation");
            let violations = check(observation, &shared);
            shared.report_all(assertion, violations);
        }

        if shared.lifecycle.is_destroyed() {
            SubscriberAction::Unsubscribe
        } else {
            SubscriberAction::Continue
        }
    })
}

/// Live checks over a result.
///
/// Created by [`assert_continuously_that`]. Registration methods consume and
/// return the handle so that checks can be chained:
///
/// ```ignore
/// let markers = assert_continuously_that(&network.marker_files_result())
///     .have_no_iss_marker_files()
///     .have_no_coin_round_marker_files();
/// markers.start_suppressing_node(NodeId(3));
/// ```
pub struct ContinuousAssert<S: ?Sized> {
    subject: Arc<S>,
    shared: Arc<MonitorShared>,
}

/// Start continuous assertions on `subject`, collecting violations with the default context.
pub fn assert_continuously_that<S: ?Sized>(subject: &Arc<S>) -> ContinuousAssert<S> {
    assert_continuously_that_with(subject, MonitorContext::default())
}

/// Start continuous assertions on `subject` with an explicit configuration and handler.
pub fn assert_continuously_that_with<S: ?Sized>(
    subject: &Arc<S>,
    context: MonitorContext,
) -> ContinuousAssert<S> {
    ContinuousAssert {
        subject: Arc::clone(subject),
        shared: Arc::new(MonitorShared::new(context)),
    }
}

impl<S: ?Sized> ContinuousAssert<S> {
    /// The monitored result
    pub fn subject(&self) -> &Arc<S> {
        &self.subject
    }

    /// Configuration the checks read their limits from
    pub fn config(&self) -> &MonitorConfig {
        self.shared.config()
    }

    /// Current lifecycle state
    pub fn state(&self) -> AssertionState {
        self.shared.lifecycle.state()
    }

    /// Ignore observations until [`resume`](Self::resume). Returns whether the state changed.
    pub fn pause(&self) -> bool {
        let changed = self.shared.lifecycle.pause();
        debug!(changed, "pause continuous assertion");
        changed
    }

    /// Evaluate observations again. Returns whether the state changed.
    pub fn resume(&self) -> bool {
        let changed = self.shared.lifecycle.resume();
        debug!(changed, "resume continuous assertion");
        changed
    }

    /// Stop permanently. Subscriptions are dropped on their next delivery.
    pub fn destroy(&self) -> bool {
        let changed = self.shared.lifecycle.destroy();
        debug!(changed, "destroy continuous assertion");
        changed
    }

    /// Ignore observations from `node` until [`stop_suppressing_node`](Self::stop_suppressing_node)
    pub fn start_suppressing_node(&self, node: NodeId) {
        let added = self.shared.suppressions.nodes().start(node);
        debug!(node = %node, added, "start suppressing node");
    }

    /// Evaluate observations from `node` again
    pub fn stop_suppressing_node(&self, node: NodeId) {
        let removed = self.shared.suppressions.nodes().stop(&node);
        debug!(node = %node, removed, "stop suppressing node");
    }

    /// Ignore log lines carrying `marker`
    pub fn start_suppressing_log_marker(&self, marker: impl Into<String>) {
        let marker = marker.into();
        debug!(marker = %marker, "start suppressing log marker");
        self.shared.suppressions.log_markers().start(marker);
    }

    /// Evaluate log lines carrying `marker` again
    pub fn stop_suppressing_log_marker(&self, marker: &str) {
        let removed = self.shared.suppressions.log_markers().stop(marker);
        debug!(marker, removed, "stop suppressing log marker");
    }

    /// Current suppressions
    pub fn suppressions(&self) -> &Suppressions {
        &self.shared.suppressions
    }

    /// Violations retained by the handler so far
    pub fn violations(&self) -> Vec<Violation> {
        self.shared.context.handler().recorded()
    }

    /// Panic if the handler retained any violation.
    #[track_caller]
    pub fn assert_no_violations(&self) {
        let violations = self.violations();
        if !violations.is_empty() {
            let rendered: Vec<String> = violations.iter().map(ToString::to_string).collect();
            panic!(
                "{} continuous assertion violation(s):\n{}",
                violations.len(),
                rendered.join("\n")
            );
        }
    }

    /// Run end-of-input checks, such as unfinished status progressions.
    ///
    /// Violations are reported to the handler and returned. Does nothing
    /// unless the assertion is active, and stops once a violation destroys it.
    pub fn finish(&self) -> Vec<Violation> {
        if !self.shared.lifecycle.is_active() {
            debug!(state = %self.state(), "skipping finish of inactive assertion");
            return Vec::new();
        }
        let finishers = self.shared.finishers.lock();
        let mut found = Vec::new();
        for (assertion, finisher) in finishers.iter() {
            if self.shared.lifecycle.is_destroyed() {
                break;
            }
            let violations = finisher(&self.shared);
            found.extend(self.shared.report_all(assertion, violations));
        }
        found
    }

    /// Subscribe `check` to the subject.
    fn register<T, F>(self, assertion: &'static str, check: F) -> Self
    where
        T: Observation,
        S: Observable<T>,
        F: FnMut(&T, &MonitorShared) -> Vec<Violation> + Send + 'static,
    {
        debug!(assertion, nodes = ?self.subject.observed_nodes(), "register continuous check");
        self.subject
            .subscribe_observer(monitor(&self.shared, assertion, check));
        self
    }

    /// Add an end-of-input check run by [`finish`](Self::finish).
    fn on_finish(
        &self,
        assertion: &'static str,
        finisher: impl Fn(&MonitorShared) -> Vec<Violation> + Send + Sync + 'static,
    ) {
        self.shared
            .finishers
            .lock()
            .push((assertion, Box::new(finisher)));
    }
}

impl<S: ?Sized> Clone for ContinuousAssert<S> {
    fn clone(&self) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: ?Sized> fmt::Debug for ContinuousAssert<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuousAssert")
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

/// Collect the error of a single check into the form `monitor` expects
pub(crate) fn single(result: Result<(), Violation>) -> Vec<Violation> {
    result.err().into_iter().collect()
}
