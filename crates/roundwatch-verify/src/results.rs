//! Node results exposed by the telemetry collaborator
//!
//! One trait per observation type, in a single-node and a multi-node flavor.
//! Each offers a snapshot of what has been observed so far and a `subscribe`
//! operation that delivers later observations live. Assertions are written
//! against `Arc<dyn Trait>` handles so that any collaborator can plug in.

use crate::subscription::Subscriber;
use roundwatch_core::{
    ConsensusRound, MarkerFilesObservation, MarkerFilesStatus, NodeId, PlatformStatus,
    ReconnectNotification, Round, RoundBatch, StatusObservation, StructuredLog,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Consensus rounds of a single node.
pub trait NodeConsensusRounds: Send + Sync {
    /// Node the rounds belong to
    fn node_id(&self) -> NodeId;

    /// Rounds observed so far, in delivery order
    fn rounds(&self) -> Vec<ConsensusRound>;

    /// Deliver later round batches to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<RoundBatch>);

    /// Number of the last observed round
    fn last_round_num(&self) -> Option<Round> {
        self.rounds().last().map(|round| round.round_num)
    }
}

/// Consensus rounds of several nodes.
pub trait MultiNodeConsensusRounds: Send + Sync {
    /// Per-node results
    fn results(&self) -> Vec<Arc<dyn NodeConsensusRounds>>;

    /// Deliver later round batches of every node to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<RoundBatch>);

    /// Snapshot of every node's rounds, keyed by node
    fn histories(&self) -> BTreeMap<NodeId, Vec<ConsensusRound>> {
        self.results()
            .into_iter()
            .map(|result| (result.node_id(), result.rounds()))
            .collect()
    }
}

/// Platform status history of a single node.
pub trait NodePlatformStatus: Send + Sync {
    /// Node the statuses belong to
    fn node_id(&self) -> NodeId;

    /// Statuses entered so far, in order
    fn statuses(&self) -> Vec<PlatformStatus>;

    /// Deliver later status changes to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<StatusObservation>);
}

/// Platform status histories of several nodes.
pub trait MultiNodePlatformStatus: Send + Sync {
    /// Per-node results
    fn results(&self) -> Vec<Arc<dyn NodePlatformStatus>>;

    /// Deliver later status changes of every node to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<StatusObservation>);
}

/// Reconnect notifications of a single node.
pub trait NodeReconnects: Send + Sync {
    /// Node the notifications belong to
    fn node_id(&self) -> NodeId;

    /// Notifications observed so far, in order
    fn notifications(&self) -> Vec<ReconnectNotification>;

    /// Deliver later notifications to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<ReconnectNotification>);
}

/// Reconnect notifications of several nodes.
pub trait MultiNodeReconnects: Send + Sync {
    /// Per-node results
    fn results(&self) -> Vec<Arc<dyn NodeReconnects>>;

    /// Deliver later notifications of every node to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<ReconnectNotification>);
}

/// Marker files of a single node.
pub trait NodeMarkerFiles: Send + Sync {
    /// Node the marker files belong to
    fn node_id(&self) -> NodeId;

    /// Current marker-file snapshot
    fn status(&self) -> MarkerFilesStatus;

    /// Deliver later snapshots to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<MarkerFilesObservation>);
}

/// Marker files of several nodes.
pub trait MultiNodeMarkerFiles: Send + Sync {
    /// Per-node results
    fn results(&self) -> Vec<Arc<dyn NodeMarkerFiles>>;

    /// Deliver later snapshots of every node to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<MarkerFilesObservation>);
}

/// Structured logs of a single node.
pub trait NodeLogs: Send + Sync {
    /// Node the logs belong to
    fn node_id(&self) -> NodeId;

    /// Log lines observed so far, in order
    fn logs(&self) -> Vec<StructuredLog>;

    /// Deliver later log lines to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<StructuredLog>);
}

/// Structured logs of several nodes.
pub trait MultiNodeLogs: Send + Sync {
    /// Per-node results
    fn results(&self) -> Vec<Arc<dyn NodeLogs>>;

    /// Deliver later log lines of every node to `subscriber`
    fn subscribe(&self, subscriber: Subscriber<StructuredLog>);
}
