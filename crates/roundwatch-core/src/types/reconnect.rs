//! Reconnect notifications

use crate::identifiers::NodeId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Progress of a reconnect attempt.
///
/// The originating node may be unknown when the notification is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconnectNotification {
    /// A reconnect attempt began
    Start {
        /// Reconnecting node
        node: Option<NodeId>,
    },
    /// The attempt failed
    Failure {
        /// Reconnecting node
        node: Option<NodeId>,
        /// Diagnostic payload
        payload: String,
    },
    /// The attempt succeeded and state synchronization completed
    SyncComplete {
        /// Reconnecting node
        node: Option<NodeId>,
        /// Total reconnect duration
        reconnect_time: Duration,
        /// Time spent initializing the state tree
        tree_initialization_time: Duration,
    },
}

impl ReconnectNotification {
    /// Node the notification originates from, if known
    pub fn node(&self) -> Option<NodeId> {
        match self {
            ReconnectNotification::Start { node }
            | ReconnectNotification::Failure { node, .. }
            | ReconnectNotification::SyncComplete { node, .. } => *node,
        }
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            ReconnectNotification::Start { .. } => "start",
            ReconnectNotification::Failure { .. } => "failure",
            ReconnectNotification::SyncComplete { .. } => "sync_complete",
        }
    }
}
