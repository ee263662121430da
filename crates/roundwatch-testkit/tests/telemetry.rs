//! In-memory telemetry feeds and result views

#![allow(clippy::unwrap_used, missing_docs)]

use parking_lot::Mutex;
use roundwatch_core::{LogLevel, MarkerFile, NodeId, PlatformStatus, ReconnectNotification};
use roundwatch_testkit::{NetworkTelemetry, NodeTelemetry, RoundHistoryFactory};
use roundwatch_verify::results::{
    MultiNodeConsensusRounds, MultiNodeLogs, MultiNodePlatformStatus, NodeConsensusRounds,
    NodeLogs, NodeMarkerFiles, NodePlatformStatus, NodeReconnects,
};
use roundwatch_verify::{Subscriber, SubscriberAction};
use std::sync::Arc;
use std::time::Duration;

fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Subscriber<T>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscriber: Subscriber<T> = Box::new(move |observation: &T| {
        sink.lock().push(observation.clone());
        SubscriberAction::Continue
    });
    (seen, subscriber)
}

#[test]
fn test_node_records_history() {
    let node = NodeTelemetry::standalone(NodeId(5));
    node.deliver_rounds(RoundHistoryFactory::new().build(3));
    node.deliver_rounds(RoundHistoryFactory::new().starting_at(4).build(2));
    node.reconnect(Duration::from_secs(1), Duration::from_millis(200));
    node.write_marker_file(MarkerFile::CoinRound);

    let rounds = node.rounds_result();
    assert_eq!(rounds.node_id(), NodeId(5));
    assert_eq!(rounds.rounds().len(), 5);
    assert_eq!(rounds.last_round_num(), Some(5));

    let notifications = node.reconnect_result().notifications();
    assert_eq!(notifications.len(), 2);
    assert!(matches!(notifications[1], ReconnectNotification::SyncComplete { .. }));
    assert!(node.marker_files_result().status().coin_round_marker);
}

#[test]
fn test_network_feed_aggregates_all_nodes() {
    let network = NetworkTelemetry::new(3);
    let (seen, subscriber) = recorder();
    MultiNodePlatformStatus::subscribe(network.as_ref(), subscriber);

    network.nodes()[2].enter_status(PlatformStatus::Active);
    network.nodes()[0].enter_status(PlatformStatus::Behind);

    let nodes: Vec<NodeId> = seen.lock().iter().map(|observation| observation.node).collect();
    assert_eq!(nodes, vec![NodeId(2), NodeId(0)]);
    let statuses = network.status_result().results()[0].statuses();
    assert_eq!(statuses, vec![PlatformStatus::Behind]);
}

#[test]
fn test_node_feed_sees_only_its_node() {
    let network = NetworkTelemetry::new(2);
    let (seen, subscriber) = recorder();
    NodeConsensusRounds::subscribe(network.nodes()[1].as_ref(), subscriber);

    let history = RoundHistoryFactory::new().build(2);
    network.nodes()[0].deliver_rounds(history.clone());
    network.nodes()[1].deliver_rounds(history);

    let batches = seen.lock();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].node, NodeId(1));
    assert_eq!(network.rounds_result().results().len(), 2);
}

#[test]
fn test_logs_attributed_to_node() {
    let network = NetworkTelemetry::with_nodes([NodeId(10), NodeId(20)]);
    let node = network.node(NodeId(20)).unwrap();
    node.log_message(LogLevel::Warn, Some("SYNC"), "behind by 3 rounds");

    let logs = network.logs_result().results()[1].logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].node, Some(NodeId(20)));
    assert_eq!(logs[0].marker.as_deref(), Some("SYNC"));
    assert!(network.node(NodeId(30)).is_none());
}
