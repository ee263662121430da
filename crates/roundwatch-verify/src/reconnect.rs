//! Reconnect checks

use crate::violation::Violation;
use roundwatch_core::{NodeId, NodeLabel, ReconnectNotification};
use std::time::Duration;

/// Fail on a failed reconnect attempt.
pub fn check_not_failed(notification: &ReconnectNotification) -> Result<(), Violation> {
    match notification {
        ReconnectNotification::Failure { node, payload } => Err(Violation::ReconnectFailed {
            node: NodeLabel(*node),
            payload: payload.clone(),
        }),
        ReconnectNotification::Start { .. } | ReconnectNotification::SyncComplete { .. } => Ok(()),
    }
}

/// Fail on any reconnect activity.
pub fn check_no_reconnect(notification: &ReconnectNotification) -> Result<(), Violation> {
    Err(Violation::UnexpectedReconnect {
        node: NodeLabel(notification.node()),
        kind: notification.kind(),
    })
}

/// Fail when a completed reconnect took longer than `max`.
pub fn check_reconnect_time(
    notification: &ReconnectNotification,
    max: Duration,
) -> Result<(), Violation> {
    match notification {
        ReconnectNotification::SyncComplete {
            node,
            reconnect_time,
            ..
        } if *reconnect_time > max => Err(Violation::ReconnectTooSlow {
            node: NodeLabel(*node),
            actual: *reconnect_time,
            max,
        }),
        ReconnectNotification::Start { .. }
        | ReconnectNotification::Failure { .. }
        | ReconnectNotification::SyncComplete { .. } => Ok(()),
    }
}

/// Fail when tree initialization of a completed reconnect took longer than `max`.
pub fn check_tree_initialization_time(
    notification: &ReconnectNotification,
    max: Duration,
) -> Result<(), Violation> {
    match notification {
        ReconnectNotification::SyncComplete {
            node,
            tree_initialization_time,
            ..
        } if *tree_initialization_time > max => Err(Violation::TreeInitializationTooSlow {
            node: NodeLabel(*node),
            actual: *tree_initialization_time,
            max,
        }),
        ReconnectNotification::Start { .. }
        | ReconnectNotification::Failure { .. }
        | ReconnectNotification::SyncComplete { .. } => Ok(()),
    }
}

/// Fail unless `node` completed exactly `expected` reconnects.
pub fn check_exact_successful_reconnects(
    node: NodeId,
    summary: &ReconnectSummary,
    expected: usize,
) -> Result<(), Violation> {
    if summary.succeeded == expected {
        return Ok(());
    }
    Err(Violation::ReconnectCount {
        node,
        expected: format!("== {expected}"),
        actual: summary.succeeded,
    })
}

/// Fail unless `node` completed at least `min` reconnects.
pub fn check_min_successful_reconnects(
    node: NodeId,
    summary: &ReconnectSummary,
    min: usize,
) -> Result<(), Violation> {
    if summary.succeeded >= min {
        return Ok(());
    }
    Err(Violation::ReconnectCount {
        node,
        expected: format!(">= {min}"),
        actual: summary.succeeded,
    })
}

/// Counts over a node's reconnect history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconnectSummary {
    /// Attempts started
    pub started: usize,
    /// Attempts failed
    pub failed: usize,
    /// Attempts completed
    pub succeeded: usize,
    /// Longest completed reconnect
    pub longest_reconnect: Option<Duration>,
    /// Longest tree initialization
    pub longest_tree_initialization: Option<Duration>,
}

impl ReconnectSummary {
    /// Summarize a notification history
    pub fn from_notifications(notifications: &[ReconnectNotification]) -> Self {
        let mut summary = Self::default();
        for notification in notifications {
            match notification {
                ReconnectNotification::Start { .. } => summary.started += 1,
                ReconnectNotification::Failure { .. } => summary.failed += 1,
                ReconnectNotification::SyncComplete {
                    reconnect_time,
                    tree_initialization_time,
                    ..
                } => {
                    summary.succeeded += 1;
                    summary.longest_reconnect =
                        summary.longest_reconnect.max(Some(*reconnect_time));
                    summary.longest_tree_initialization = summary
                        .longest_tree_initialization
                        .max(Some(*tree_initialization_time));
                }
            }
        }
        summary
    }

    /// Whether any reconnect activity was seen
    pub fn is_empty(&self) -> bool {
        self.started == 0 && self.failed == 0 && self.succeeded == 0
    }
}
