//! Subjects a continuous assertion can subscribe to

use crate::results::{
    MultiNodeConsensusRounds, MultiNodeLogs, MultiNodeMarkerFiles, MultiNodePlatformStatus,
    MultiNodeReconnects, NodeConsensusRounds, NodeLogs, NodeMarkerFiles, NodePlatformStatus,
    NodeReconnects,
};
use crate::subscription::Subscriber;
use roundwatch_core::{
    MarkerFilesObservation, NodeId, ReconnectNotification, RoundBatch, StatusObservation,
    StructuredLog,
};

/// An observation that may name the node it came from.
pub trait Observation: Send + 'static {
    /// Originating node, if known
    fn source_node(&self) -> Option<NodeId>;
}

impl Observation for RoundBatch {
    fn source_node(&self) -> Option<NodeId> {
        Some(self.node)
    }
}

impl Observation for StatusObservation {
    fn source_node(&self) -> Option<NodeId> {
        Some(self.node)
    }
}

impl Observation for ReconnectNotification {
    fn source_node(&self) -> Option<NodeId> {
        self.node()
    }
}

impl Observation for MarkerFilesObservation {
    fn source_node(&self) -> Option<NodeId> {
        Some(self.node)
    }
}

impl Observation for StructuredLog {
    fn source_node(&self) -> Option<NodeId> {
        self.node
    }
}

/// A single- or multi-node result delivering observations of type `T`.
pub trait Observable<T: Observation>: Send + Sync {
    /// Nodes covered by this result at the time of the call
    fn observed_nodes(&self) -> Vec<NodeId>;

    /// Register `subscriber` for later observations
    fn subscribe_observer(&self, subscriber: Subscriber<T>);
}

macro_rules! single_node_source {
    ($subject:ident, $observation:ty) => {
        impl Observable<$observation> for dyn $subject {
            fn observed_nodes(&self) -> Vec<NodeId> {
                vec![self.node_id()]
            }

            fn subscribe_observer(&self, subscriber: Subscriber<$observation>) {
                self.subscribe(subscriber);
            }
        }
    };
}

macro_rules! multi_node_source {
    ($subject:ident, $observation:ty) => {
        impl Observable<$observation> for dyn $subject {
            fn observed_nodes(&self) -> Vec<NodeId> {
                self.results()
                    .iter()
                    .map(|result| result.node_id())
                    .collect()
            }

            fn subscribe_observer(&self, subscriber: Subscriber<$observation>) {
                self.subscribe(subscriber);
            }
        }
    };
}

single_node_source!(NodeConsensusRounds, RoundBatch);
single_node_source!(NodePlatformStatus, StatusObservation);
single_node_source!(NodeReconnects, ReconnectNotification);
single_node_source!(NodeMarkerFiles, MarkerFilesObservation);
single_node_source!(NodeLogs, StructuredLog);

multi_node_source!(MultiNodeConsensusRounds, RoundBatch);
multi_node_source!(MultiNodePlatformStatus, StatusObservation);
multi_node_source!(MultiNodeReconnects, ReconnectNotification);
multi_node_source!(MultiNodeMarkerFiles, MarkerFilesObservation);
multi_node_source!(MultiNodeLogs, StructuredLog);
