//! In-memory node results
//!
//! [`NodeTelemetry`] records what one simulated node reports and publishes it
//! to its own feeds and to the feeds of the network it belongs to.
//! [`NetworkTelemetry`] groups nodes and exposes the multi-node results.
//! Both implement the result traits of `roundwatch-verify`, so tests hand
//! them to `assert_that` and `assert_continuously_that` directly.

use crate::feed::Feed;
use parking_lot::Mutex;
use roundwatch_core::{
    ConsensusRound, IssType, LogLevel, MarkerFile, MarkerFilesObservation, MarkerFilesStatus,
    NodeId, PlatformStatus, ReconnectNotification, RoundBatch, StatusObservation, StructuredLog,
};
use roundwatch_verify::results::{
    MultiNodeConsensusRounds, MultiNodeLogs, MultiNodeMarkerFiles, MultiNodePlatformStatus,
    MultiNodeReconnects, NodeConsensusRounds, NodeLogs, NodeMarkerFiles, NodePlatformStatus,
    NodeReconnects,
};
use roundwatch_verify::Subscriber;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// One feed per observation type.
#[derive(Debug, Default)]
pub struct TelemetryFeeds {
    rounds: Feed<RoundBatch>,
    statuses: Feed<StatusObservation>,
    reconnects: Feed<ReconnectNotification>,
    marker_files: Feed<MarkerFilesObservation>,
    logs: Feed<StructuredLog>,
}

impl TelemetryFeeds {
    /// Total live subscribers over all feeds
    pub fn subscriber_count(&self) -> usize {
        self.rounds.subscriber_count()
            + self.statuses.subscriber_count()
            + self.reconnects.subscriber_count()
            + self.marker_files.subscriber_count()
            + self.logs.subscriber_count()
    }
}

#[derive(Debug, Default)]
struct History {
    rounds: Vec<ConsensusRound>,
    statuses: Vec<PlatformStatus>,
    reconnects: Vec<ReconnectNotification>,
    marker_files: MarkerFilesStatus,
    logs: Vec<StructuredLog>,
}

/// Everything one simulated node has reported.
#[derive(Debug)]
pub struct NodeTelemetry {
    node: NodeId,
    history: Mutex<History>,
    feeds: TelemetryFeeds,
    network: Arc<TelemetryFeeds>,
}

impl NodeTelemetry {
    /// A node outside any network
    pub fn standalone(node: NodeId) -> Arc<Self> {
        Arc::new(Self::new(node, Arc::new(TelemetryFeeds::default())))
    }

    fn new(node: NodeId, network: Arc<TelemetryFeeds>) -> Self {
        Self {
            node,
            history: Mutex::new(History::default()),
            feeds: TelemetryFeeds::default(),
            network,
        }
    }

    /// Node identifier
    pub fn id(&self) -> NodeId {
        self.node
    }

    /// Feeds of this node only
    pub fn feeds(&self) -> &TelemetryFeeds {
        &self.feeds
    }

    /// Report a batch of consensus rounds
    pub fn deliver_rounds(&self, rounds: Vec<ConsensusRound>) {
        self.history.lock().rounds.extend(rounds.iter().cloned());
        let batch = RoundBatch::new(self.node, rounds);
        trace!(node = %self.node, rounds = batch.rounds.len(), "deliver rounds");
        self.feeds.rounds.publish(&batch);
        self.network.rounds.publish(&batch);
    }

    /// Report a status change
    pub fn enter_status(&self, status: PlatformStatus) {
        self.history.lock().statuses.push(status);
        let observation = StatusObservation::new(self.node, status);
        trace!(node = %self.node, status = %status, "enter status");
        self.feeds.statuses.publish(&observation);
        self.network.statuses.publish(&observation);
    }

    /// Report a sequence of status changes
    pub fn enter_statuses(&self, statuses: impl IntoIterator<Item = PlatformStatus>) {
        for status in statuses {
            self.enter_status(status);
        }
    }

    /// Report a reconnect notification as is, including its node field
    pub fn notify_reconnect(&self, notification: ReconnectNotification) {
        self.history.lock().reconnects.push(notification.clone());
        trace!(node = %self.node, kind = notification.kind(), "notify reconnect");
        self.feeds.reconnects.publish(&notification);
        self.network.reconnects.publish(&notification);
    }

    /// Report a reconnect that started and completed
    pub fn reconnect(&self, reconnect_time: Duration, tree_initialization_time: Duration) {
        self.notify_reconnect(ReconnectNotification::Start {
            node: Some(self.node),
        });
        self.notify_reconnect(ReconnectNotification::SyncComplete {
            node: Some(self.node),
            reconnect_time,
            tree_initialization_time,
        });
    }

    /// Report a failed reconnect
    pub fn fail_reconnect(&self, payload: impl Into<String>) {
        self.notify_reconnect(ReconnectNotification::Failure {
            node: Some(self.node),
            payload: payload.into(),
        });
    }

    /// Report that `marker` was written
    pub fn write_marker_file(&self, marker: MarkerFile) {
        let status = {
            let mut history = self.history.lock();
            let status = &mut history.marker_files;
            match marker {
                MarkerFile::CoinRound => status.coin_round_marker = true,
                MarkerFile::NoSuperMajority => status.no_super_majority_marker = true,
                MarkerFile::NoJudges => status.no_judges_marker = true,
                MarkerFile::ConsensusException => status.consensus_exception_marker = true,
                MarkerFile::Iss(iss) => {
                    status.iss_markers.insert(iss);
                }
            }
            status.clone()
        };
        let observation = MarkerFilesObservation::new(self.node, status);
        trace!(node = %self.node, marker = %marker, "write marker file");
        self.feeds.marker_files.publish(&observation);
        self.network.marker_files.publish(&observation);
    }

    /// Report that an ISS marker of type `iss` was written
    pub fn write_iss_marker(&self, iss: IssType) {
        self.write_marker_file(MarkerFile::Iss(iss));
    }

    /// Report a log line as is
    pub fn log(&self, log: StructuredLog) {
        self.history.lock().logs.push(log.clone());
        self.feeds.logs.publish(&log);
        self.network.logs.publish(&log);
    }

    /// Report a log line attributed to this node
    pub fn log_message(&self, level: LogLevel, marker: Option<&str>, message: &str) {
        let mut log = StructuredLog::new(Some(self.node), level, message);
        if let Some(marker) = marker {
            log = log.with_marker(marker);
        }
        self.log(log);
    }

    /// This node as a consensus rounds result
    pub fn rounds_result(self: &Arc<Self>) -> Arc<dyn NodeConsensusRounds> {
        Arc::clone(self) as Arc<dyn NodeConsensusRounds>
    }

    /// This node as a platform status result
    pub fn status_result(self: &Arc<Self>) -> Arc<dyn NodePlatformStatus> {
        Arc::clone(self) as Arc<dyn NodePlatformStatus>
    }

    /// This node as a reconnect result
    pub fn reconnect_result(self: &Arc<Self>) -> Arc<dyn NodeReconnects> {
        Arc::clone(self) as Arc<dyn NodeReconnects>
    }

    /// This node as a marker files result
    pub fn marker_files_result(self: &Arc<Self>) -> Arc<dyn NodeMarkerFiles> {
        Arc::clone(self) as Arc<dyn NodeMarkerFiles>
    }

    /// This node as a log result
    pub fn logs_result(self: &Arc<Self>) -> Arc<dyn NodeLogs> {
        Arc::clone(self) as Arc<dyn NodeLogs>
    }
}

impl NodeConsensusRounds for NodeTelemetry {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn rounds(&self) -> Vec<ConsensusRound> {
        self.history.lock().rounds.clone()
    }

    fn subscribe(&self, subscriber: Subscriber<RoundBatch>) {
        self.feeds.rounds.subscribe(subscriber);
    }
}

impl NodePlatformStatus for NodeTelemetry {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn statuses(&self) -> Vec<PlatformStatus> {
        self.history.lock().statuses.clone()
    }

    fn subscribe(&self, subscriber: Subscriber<StatusObservation>) {
        self.feeds.statuses.subscribe(subscriber);
    }
}

impl NodeReconnects for NodeTelemetry {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn notifications(&self) -> Vec<ReconnectNotification> {
        self.history.lock().reconnects.clone()
    }

    fn subscribe(&self, subscriber: Subscriber<ReconnectNotification>) {
        self.feeds.reconnects.subscribe(subscriber);
    }
}

impl NodeMarkerFiles for NodeTelemetry {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn status(&self) -> MarkerFilesStatus {
        self.history.lock().marker_files.clone()
    }

    fn subscribe(&self, subscriber: Subscriber<MarkerFilesObservation>) {
        self.feeds.marker_files.subscribe(subscriber);
    }
}

impl NodeLogs for NodeTelemetry {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn logs(&self) -> Vec<StructuredLog> {
        self.history.lock().logs.clone()
    }

    fn subscribe(&self, subscriber: Subscriber<StructuredLog>) {
        self.feeds.logs.subscribe(subscriber);
    }
}

/// A simulated network of nodes sharing aggregate feeds.
#[derive(Debug)]
pub struct NetworkTelemetry {
    nodes: Vec<Arc<NodeTelemetry>>,
    feeds: Arc<TelemetryFeeds>,
}

impl NetworkTelemetry {
    /// Network of `count` nodes numbered from zero
    pub fn new(count: u64) -> Arc<Self> {
        Self::with_nodes((0..count).map(NodeId))
    }

    /// Network of the given nodes
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Arc<Self> {
        let feeds = Arc::new(TelemetryFeeds::default());
        let nodes = nodes
            .into_iter()
            .map(|node| Arc::new(NodeTelemetry::new(node, Arc::clone(&feeds))))
            .collect();
        Arc::new(Self { nodes, feeds })
    }

    /// Member nodes
    pub fn nodes(&self) -> &[Arc<NodeTelemetry>] {
        &self.nodes
    }

    /// Member node `node`, if present
    pub fn node(&self, node: NodeId) -> Option<&Arc<NodeTelemetry>> {
        self.nodes.iter().find(|member| member.id() == node)
    }

    /// Aggregate feeds of the whole network
    pub fn feeds(&self) -> &TelemetryFeeds {
        &self.feeds
    }

    /// All nodes as a consensus rounds result
    pub fn rounds_result(self: &Arc<Self>) -> Arc<dyn MultiNodeConsensusRounds> {
        Arc::clone(self) as Arc<dyn MultiNodeConsensusRounds>
    }

    /// All nodes as a platform status result
    pub fn status_result(self: &Arc<Self>) -> Arc<dyn MultiNodePlatformStatus> {
        Arc::clone(self) as Arc<dyn MultiNodePlatformStatus>
    }

    /// All nodes as a reconnect result
    pub fn reconnect_result(self: &Arc<Self>) -> Arc<dyn MultiNodeReconnects> {
        Arc::clone(self) as Arc<dyn MultiNodeReconnects>
    }

    /// All nodes as a marker files result
    pub fn marker_files_result(self: &Arc<Self>) -> Arc<dyn MultiNodeMarkerFiles> {
        Arc::clone(self) as Arc<dyn MultiNodeMarkerFiles>
    }

    /// All nodes as a log result
    pub fn logs_result(self: &Arc<Self>) -> Arc<dyn MultiNodeLogs> {
        Arc::clone(self) as Arc<dyn MultiNodeLogs>
    }
}

impl MultiNodeConsensusRounds for NetworkTelemetry {
    fn results(&self) -> Vec<Arc<dyn NodeConsensusRounds>> {
        self.nodes.iter().map(NodeTelemetry::rounds_result).collect()
    }

    fn subscribe(&self, subscriber: Subscriber<RoundBatch>) {
        self.feeds.rounds.subscribe(subscriber);
    }
}

impl MultiNodePlatformStatus for NetworkTelemetry {
    fn results(&self) -> Vec<Arc<dyn NodePlatformStatus>> {
        self.nodes.iter().map(NodeTelemetry::status_result).collect()
    }

    fn subscribe(&self, subscriber: Subscriber<StatusObservation>) {
        self.feeds.statuses.subscribe(subscriber);
    }
}

impl MultiNodeReconnects for NetworkTelemetry {
    fn results(&self) -> Vec<Arc<dyn NodeReconnects>> {
        self.nodes.iter().map(NodeTelemetry::reconnect_result).collect()
    }

    fn subscribe(&self, subscriber: Subscriber<ReconnectNotification>) {
        self.feeds.reconnects.subscribe(subscriber);
    }
}

impl MultiNodeMarkerFiles for NetworkTelemetry {
    fn results(&self) -> Vec<Arc<dyn NodeMarkerFiles>> {
        self.nodes.iter().map(NodeTelemetry::marker_files_result).collect()
    }

    fn subscribe(&self, subscriber: Subscriber<MarkerFilesObservation>) {
        self.feeds.marker_files.subscribe(subscriber);
    }
}

impl MultiNodeLogs for NetworkTelemetry {
    fn results(&self) -> Vec<Arc<dyn NodeLogs>> {
        self.nodes.iter().map(NodeTelemetry::logs_result).collect()
    }

    fn subscribe(&self, subscriber: Subscriber<StructuredLog>) {
        self.feeds.logs.subscribe(subscriber);
    }
}
