//! Continuous reconnect checks

use super::{single, ContinuousAssert, Observable};
use crate::reconnect::{
    check_no_reconnect, check_not_failed, check_reconnect_time, check_tree_initialization_time,
};
use roundwatch_core::ReconnectNotification;
use std::time::Duration;

impl<S> ContinuousAssert<S>
where
    S: ?Sized + Observable<ReconnectNotification>,
{
    /// Fail on every failed reconnect attempt.
    pub fn have_no_failed_reconnects(self) -> Self {
        self.register("no failed reconnects", |notification: &ReconnectNotification, _shared| {
            single(check_not_failed(notification))
        })
    }

    /// Fail on any reconnect activity at all.
    pub fn have_no_reconnects(self) -> Self {
        self.register("no reconnects", |notification: &ReconnectNotification, _shared| {
            single(check_no_reconnect(notification))
        })
    }

    /// Fail when a completed reconnect took longer than `max`.
    pub fn have_max_reconnect_time(self, max: Duration) -> Self {
        self.register("max reconnect time", move |notification: &ReconnectNotification, _shared| {
            single(check_reconnect_time(notification, max))
        })
    }

    /// Fail when tree initialization of a completed reconnect took longer than `max`.
    pub fn have_max_tree_initialization_time(self, max: Duration) -> Self {
        self.register(
            "max tree initialization time",
            move |notification: &ReconnectNotification, _shared| {
                single(check_tree_initialization_time(notification, max))
            },
        )
    }

    /// Apply both duration limits from the monitor configuration.
    pub fn have_reconnect_times_within_limits(self) -> Self {
        let max_reconnect = self.config().max_reconnect_time();
        let max_tree_initialization = self.config().max_tree_initialization_time();
        self.register(
            "configured reconnect limits",
            move |notification: &ReconnectNotification, _shared| {
                let mut violations = single(check_reconnect_time(notification, max_reconnect));
                violations.extend(single(check_tree_initialization_time(
                    notification,
                    max_tree_initialization,
                )));
                violations
            },
        )
    }
}
