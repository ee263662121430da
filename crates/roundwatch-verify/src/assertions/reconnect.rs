use super::{ensure, ResultAssert};
use crate::reconnect::{
    check_exact_successful_reconnects, check_min_successful_reconnects, check_no_reconnect,
    check_not_failed, check_reconnect_time, check_tree_initialization_time, ReconnectSummary,
};
use crate::results::{MultiNodeReconnects, NodeReconnects};
use crate::violation::Violation;
use roundwatch_core::ReconnectNotification;
use std::sync::Arc;
use std::time::Duration;

#[track_caller]
fn each(
    result: &dyn NodeReconnects,
    check: impl Fn(&ReconnectNotification) -> Result<(), Violation>,
) {
    for notification in result.notifications() {
        ensure(check(&notification));
    }
}

#[track_caller]
fn exact(result: &dyn NodeReconnects, expected: usize) {
    let summary = ReconnectSummary::from_notifications(&result.notifications());
    ensure(check_exact_successful_reconnects(result.node_id(), &summary, expected));
}

#[track_caller]
fn at_least(result: &dyn NodeReconnects, min: usize) {
    let summary = ReconnectSummary::from_notifications(&result.notifications());
    ensure(check_min_successful_reconnects(result.node_id(), &summary, min));
}

impl ResultAssert<'_, dyn NodeReconnects> {
    /// No reconnect activity at all
    #[track_caller]
    pub fn has_no_reconnects(self) -> Self {
        each(self.subject, check_no_reconnect);
        self
    }

    /// No reconnect attempt failed
    #[track_caller]
    pub fn has_no_failed_reconnects(self) -> Self {
        each(self.subject, check_not_failed);
        self
    }

    /// Exactly `expected` reconnects completed
    #[track_caller]
    pub fn has_exact_successful_reconnects(self, expected: usize) -> Self {
        exact(self.subject, expected);
        self
    }

    /// At least `min` reconnects completed
    #[track_caller]
    pub fn has_min_successful_reconnects(self, min: usize) -> Self {
        at_least(self.subject, min);
        self
    }

    /// Every completed reconnect took at most `max`
    #[track_caller]
    pub fn has_max_reconnect_time(self, max: Duration) -> Self {
        each(self.subject, |notification| check_reconnect_time(notification, max));
        self
    }

    /// Every tree initialization took at most `max`
    #[track_caller]
    pub fn has_max_tree_initialization_time(self, max: Duration) -> Self {
        each(self.subject, |notification| {
            check_tree_initialization_time(notification, max)
        });
        self
    }
}

impl ResultAssert<'_, dyn MultiNodeReconnects> {
    fn nodes(&self) -> Vec<Arc<dyn NodeReconnects>> {
        self.subject.results()
    }

    /// No node reconnected
    #[track_caller]
    pub fn have_no_reconnects(self) -> Self {
        for result in self.nodes() {
            each(result.as_ref(), check_no_reconnect);
        }
        self
    }

    /// No node's reconnect attempt failed
    #[track_caller]
    pub fn have_no_failed_reconnects(self) -> Self {
        for result in self.nodes() {
            each(result.as_ref(), check_not_failed);
        }
        self
    }

    /// Every node completed exactly `expected` reconnects
    #[track_caller]
    pub fn have_exact_successful_reconnects(self, expected: usize) -> Self {
        for result in self.nodes() {
            exact(result.as_ref(), expected);
        }
        self
    }

    /// Every node completed at least `min` reconnects
    #[track_caller]
    pub fn have_min_successful_reconnects(self, min: usize) -> Self {
        for result in self.nodes() {
            at_least(result.as_ref(), min);
        }
        self
    }

    /// Every completed reconnect of every node took at most `max`
    #[track_caller]
    pub fn have_max_reconnect_time(self, max: Duration) -> Self {
        for result in self.nodes() {
            each(result.as_ref(), |notification| check_reconnect_time(notification, max));
        }
        self
    }

    /// Every tree initialization of every node took at most `max`
    #[track_caller]
    pub fn have_max_tree_initialization_time(self, max: Duration) -> Self {
        for result in self.nodes() {
            each(result.as_ref(), |notification| {
                check_tree_initialization_time(notification, max)
            });
        }
        self
    }
}
