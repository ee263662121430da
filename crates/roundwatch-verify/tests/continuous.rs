//! Continuous assertions fed by in-memory node results

#![allow(clippy::unwrap_used, missing_docs)]

use assert_matches::assert_matches;
use roundwatch_core::{ConsensusRound, MarkerFile, ReconnectNotification};
use roundwatch_testkit::{
    assert_no_violation, assert_violation, diverge, event, init_test_tracing, panic_message,
    with_code, NetworkTelemetry, NodeTelemetry, RoundHistoryFactory,
};
use roundwatch_verify::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn round_with_threshold(round_num: Round, ancient_threshold: u64) -> ConsensusRound {
    ConsensusRound::new(
        round_num,
        ancient_threshold,
        vec![event(NodeId(0), round_num, round_num * 10, round_num)],
    )
}

#[test]
fn test_round_validation_carries_over_batches() {
    init_test_tracing();
    let node = NodeTelemetry::standalone(NodeId(1));
    let rounds = assert_continuously_that(&node.rounds_result()).have_consistent_rounds();

    node.deliver_rounds(vec![round_with_threshold(1, 0), round_with_threshold(2, 3)]);
    rounds.assert_no_violations();

    // Regression across the batch boundary
    node.deliver_rounds(vec![round_with_threshold(3, 2)]);
    let violations = rounds.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0],
        Violation::AncientThresholdRegression {
            node: NodeId(1),
            round: 3,
            previous_round: 2,
            expected_min: 3,
            actual: 2,
        }
    );
}

#[test]
fn test_monitor_keeps_running_after_violation() {
    let node = NodeTelemetry::standalone(NodeId(1));
    let rounds = assert_continuously_that(&node.rounds_result()).have_consistent_rounds();

    node.deliver_rounds(vec![round_with_threshold(1, 5), round_with_threshold(2, 4)]);
    node.deliver_rounds(vec![round_with_threshold(3, 3)]);
    assert_eq!(rounds.violations().len(), 2);
    assert_eq!(rounds.state(), AssertionState::Active);
    assert_eq!(node.feeds().subscriber_count(), 1);
}

#[test]
fn test_destroy_on_violation_policy() {
    let config = MonitorConfig {
        violation_policy: ViolationPolicy::DestroyOnViolation,
        ..MonitorConfig::default()
    };
    let node = NodeTelemetry::standalone(NodeId(1));
    let rounds = assert_continuously_that_with(
        &node.rounds_result(),
        MonitorContext::new(config, CollectingHandler::new()),
    )
    .have_consistent_rounds();

    node.deliver_rounds(vec![round_with_threshold(1, 5), round_with_threshold(2, 4)]);
    assert_eq!(rounds.state(), AssertionState::Destroyed);
    assert_eq!(rounds.violations().len(), 1);
    assert_eq!(node.feeds().subscriber_count(), 0);

    node.deliver_rounds(vec![round_with_threshold(3, 0)]);
    assert_eq!(rounds.violations().len(), 1);
}

#[test]
fn test_cross_node_agreement_while_streaming() {
    let network = NetworkTelemetry::new(3);
    let rounds = assert_continuously_that(&network.rounds_result()).have_consistent_rounds();
    let history = RoundHistoryFactory::new().build(8);

    network.nodes()[0].deliver_rounds(history[..5].to_vec());
    network.nodes()[1].deliver_rounds(history[..3].to_vec());
    network.nodes()[2].deliver_rounds(history[..8].to_vec());
    network.nodes()[1].deliver_rounds(history[3..6].to_vec());
    rounds.assert_no_violations();

    let mut late = history[6..8].to_vec();
    late[0] = diverge(&late[0]);
    network.nodes()[0].deliver_rounds(late);
    let mismatches = rounds.violations();
    assert_eq!(mismatches.len(), 1);
    assert_matches!(
        &mismatches[0],
        Violation::RoundMismatch { reference, node, round, .. } => {
            assert_eq!(*reference, NodeId(2));
            assert_eq!(*node, NodeId(0));
            assert_eq!(*round, 7);
        }
    );
}

#[test]
fn test_equal_rounds_ignores_suppressed_node() {
    let network = NetworkTelemetry::new(2);
    let equal = assert_continuously_that(&network.rounds_result()).have_equal_rounds();
    equal.start_suppressing_node(NodeId(1));

    let history = RoundHistoryFactory::new().build(3);
    let forked: Vec<ConsensusRound> = history.iter().map(diverge).collect();
    network.nodes()[0].deliver_rounds(history);
    network.nodes()[1].deliver_rounds(forked);
    equal.assert_no_violations();
}

#[test]
fn test_status_progression_incremental_and_finish() {
    let network = NetworkTelemetry::new(2);
    let statuses = assert_continuously_that(&network.status_result()).have_steps([
        target(PlatformStatus::StartingUp),
        target(PlatformStatus::Active).optional_interim([PlatformStatus::Checking]),
    ]);

    network.nodes()[0].enter_statuses([
        PlatformStatus::StartingUp,
        PlatformStatus::Checking,
        PlatformStatus::Active,
    ]);
    network.nodes()[1].enter_status(PlatformStatus::StartingUp);
    statuses.assert_no_violations();

    let unfinished = statuses.finish();
    assert_eq!(unfinished.len(), 1);
    assert_eq!(unfinished[0].node(), Some(NodeId(1)));
    assert!(unfinished[0]
        .to_string()
        .contains("fewer steps than expected: matched 1 of 2"));
    assert_eq!(statuses.violations().len(), 1);
}

#[test]
fn test_finish_stops_after_destroying_violation() {
    let config = MonitorConfig {
        violation_policy: ViolationPolicy::DestroyOnViolation,
        ..MonitorConfig::default()
    };
    let network = NetworkTelemetry::new(3);
    let statuses = assert_continuously_that_with(
        &network.status_result(),
        MonitorContext::new(config, CollectingHandler::new()),
    )
    .have_steps([target(PlatformStatus::StartingUp), target(PlatformStatus::Active)]);
    network.nodes()[0].enter_status(PlatformStatus::StartingUp);

    let unfinished = statuses.finish();
    assert_eq!(unfinished.len(), 1);
    assert_eq!(unfinished[0].node(), Some(NodeId(0)));
    assert_eq!(statuses.violations(), unfinished);
    assert_eq!(statuses.state(), AssertionState::Destroyed);
    let again = statuses.finish();
    assert_no_violation!(again);
}

#[test]
fn test_equal_rounds_needs_two_nodes() {
    let node = NodeTelemetry::standalone(NodeId(1));
    let equal = assert_continuously_that(&node.rounds_result()).have_equal_rounds();
    assert_eq!(node.feeds().subscriber_count(), 0);

    let consistent = assert_continuously_that(&node.rounds_result()).have_consistent_rounds();
    assert_eq!(node.feeds().subscriber_count(), 1);
    node.deliver_rounds(RoundHistoryFactory::new().build(5));
    equal.assert_no_violations();
    consistent.assert_no_violations();
}

#[test]
fn test_status_progression_reports_unexpected_status_on_delivery() {
    let node = NodeTelemetry::standalone(NodeId(7));
    let statuses = assert_continuously_that(&node.status_result())
        .have_steps([target(PlatformStatus::Active).optional_interim([PlatformStatus::Checking])]);

    node.enter_status(PlatformStatus::Behind);
    assert_violation!(statuses.violations(), "status_progression");
    assert!(statuses.violations()[0]
        .to_string()
        .contains("unexpected status BEHIND in step 0"));
}

#[test]
fn test_finish_skips_suppressed_nodes() {
    let network = NetworkTelemetry::new(2);
    let statuses = assert_continuously_that(&network.status_result())
        .have_steps([target(PlatformStatus::Active)]);
    network.nodes()[0].enter_status(PlatformStatus::Active);
    statuses.start_suppressing_node(NodeId(1));
    assert_no_violation!(statuses.finish());
}

#[test]
fn test_empty_steps_panic_at_registration() {
    let node = NodeTelemetry::standalone(NodeId(1));
    let message = panic_message(|| {
        let _ = assert_continuously_that(&node.status_result()).have_steps(Vec::new());
    })
    .unwrap();
    assert!(message.contains("at least one step"));
    assert_eq!(node.feeds().subscriber_count(), 0);
}

#[test]
fn test_status_sets() {
    let node = NodeTelemetry::standalone(NodeId(2));
    let statuses = assert_continuously_that(&node.status_result())
        .do_not_enter_any_statuses_of([PlatformStatus::CatastrophicFailure])
        .do_only_enter_statuses_of([PlatformStatus::Active, PlatformStatus::CatastrophicFailure]);

    node.enter_status(PlatformStatus::Active);
    node.enter_status(PlatformStatus::CatastrophicFailure);
    node.enter_status(PlatformStatus::Behind);
    let violations = statuses.violations();
    assert_eq!(with_code(&violations, "forbidden_status").len(), 1);
    assert_eq!(with_code(&violations, "status_not_allowed").len(), 1);
}

#[test]
fn test_reconnect_monitors() {
    let network = NetworkTelemetry::new(2);
    let reconnects = assert_continuously_that(&network.reconnect_result())
        .have_no_failed_reconnects()
        .have_max_reconnect_time(Duration::from_secs(10))
        .have_max_tree_initialization_time(Duration::from_secs(3));

    network.nodes()[0].reconnect(Duration::from_secs(8), Duration::from_secs(2));
    reconnects.assert_no_violations();

    network.nodes()[1].reconnect(Duration::from_secs(12), Duration::from_secs(4));
    network.nodes()[1].fail_reconnect("learner rejected");
    let violations = reconnects.violations();
    assert_violation!(violations, "reconnect_too_slow");
    assert_violation!(violations, "tree_initialization_too_slow");
    assert_violation!(violations, "reconnect_failed");
    assert!(violations.iter().all(|violation| violation.node() == Some(NodeId(1))));
}

#[test]
fn test_no_reconnects_and_unknown_node() {
    let node = NodeTelemetry::standalone(NodeId(1));
    let reconnects = assert_continuously_that(&node.reconnect_result()).have_no_reconnects();
    node.notify_reconnect(ReconnectNotification::Start { node: None });
    let violations = reconnects.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].node(), None);
    assert!(violations[0].to_string().contains("Unexpected reconnect of unknown"));
}

#[test]
fn test_configured_reconnect_limits() {
    let config = MonitorConfig {
        max_reconnect_secs: 5,
        max_tree_initialization_secs: 1,
        ..MonitorConfig::default()
    };
    let node = NodeTelemetry::standalone(NodeId(1));
    let reconnects = assert_continuously_that_with(
        &node.reconnect_result(),
        MonitorContext::new(config, CollectingHandler::new()),
    )
    .have_reconnect_times_within_limits();

    node.reconnect(Duration::from_secs(6), Duration::from_secs(2));
    assert_eq!(reconnects.violations().len(), 2);
}

#[test]
fn test_suppressed_node_iss_marker_is_ignored() {
    let network = NetworkTelemetry::new(3);
    let suppressed = assert_continuously_that(&network.marker_files_result()).have_no_iss_marker_files();
    suppressed.start_suppressing_node(NodeId(1));
    let unsuppressed = assert_continuously_that(&network.marker_files_result()).have_no_iss_marker_files();

    network.nodes()[1].write_iss_marker(IssType::SelfIss);
    suppressed.assert_no_violations();
    assert_eq!(unsuppressed.violations().len(), 1);
    assert_eq!(unsuppressed.violations()[0].node(), Some(NodeId(1)));
}

#[test]
fn test_suppression_round_trip() {
    let node = NodeTelemetry::standalone(NodeId(4));
    let markers = assert_continuously_that(&node.marker_files_result()).have_no_marker_files();

    markers.start_suppressing_node(NodeId(4));
    node.write_marker_file(MarkerFile::NoJudges);
    markers.assert_no_violations();

    markers.stop_suppressing_node(NodeId(4));
    node.write_marker_file(MarkerFile::NoSuperMajority);
    assert_eq!(markers.violations().len(), 1);
}

#[test]
fn test_selective_marker_monitors() {
    let node = NodeTelemetry::standalone(NodeId(1));
    let markers = assert_continuously_that(&node.marker_files_result())
        .have_no_coin_round_marker_files()
        .have_no_no_super_majority_marker_files()
        .have_no_no_judges_marker_files()
        .have_no_consensus_exception_marker_files()
        .have_no_iss_marker_files_of_type(IssType::CatastrophicIss);

    node.write_iss_marker(IssType::SelfIss);
    markers.assert_no_violations();

    node.write_marker_file(MarkerFile::ConsensusException);
    assert_eq!(markers.violations().len(), 1);
}

#[test]
fn test_log_monitors_with_marker_suppression() {
    let network = NetworkTelemetry::new(2);
    let logs = assert_continuously_that(&network.logs_result())
        .have_no_error_level_messages()
        .have_no_message_with_markers(["EXCEPTION"]);
    logs.start_suppressing_log_marker("RECONNECT");

    network.nodes()[0].log_message(LogLevel::Error, Some("RECONNECT"), "falling behind");
    network.nodes()[0].log_message(LogLevel::Warn, None, "slow gossip");
    logs.assert_no_violations();

    network.nodes()[1].log_message(LogLevel::Info, Some("EXCEPTION"), "handled");
    network.nodes()[1].log_message(LogLevel::Fatal, None, "out of memory");
    let violations = logs.violations();
    assert_violation!(violations, "forbidden_log_marker");
    assert_violation!(violations, "log_level_exceeded");

    logs.stop_suppressing_log_marker("RECONNECT");
    network.nodes()[0].log_message(LogLevel::Error, Some("RECONNECT"), "falling behind");
    assert_eq!(logs.violations().len(), 3);
}

#[test]
fn test_configured_log_limits() {
    let config = MonitorConfig {
        max_log_level: LogLevel::Info,
        forbidden_log_markers: vec!["ISS".to_string()],
        ..MonitorConfig::default()
    };
    let node = NodeTelemetry::standalone(NodeId(1));
    let logs = assert_continuously_that_with(
        &node.logs_result(),
        MonitorContext::new(config, CollectingHandler::new()),
    )
    .have_logs_within_configured_limits()
    .have_no_messages_with_level_higher_than(LogLevel::Error);

    node.log_message(LogLevel::Warn, Some("ISS"), "self ISS detected");
    let violations = logs.violations();
    assert_eq!(violations.len(), 2);
}

#[test]
fn test_pause_resume_and_destroy() {
    let node = NodeTelemetry::standalone(NodeId(1));
    let markers = assert_continuously_that(&node.marker_files_result()).have_no_marker_files();

    assert!(markers.pause());
    node.write_marker_file(MarkerFile::CoinRound);
    markers.assert_no_violations();

    assert!(markers.resume());
    node.write_marker_file(MarkerFile::NoJudges);
    assert_eq!(markers.violations().len(), 1);

    assert!(markers.destroy());
    assert!(!markers.destroy());
    assert!(!markers.resume());
    node.write_marker_file(MarkerFile::ConsensusException);
    assert_eq!(markers.violations().len(), 1);
    assert_eq!(node.feeds().subscriber_count(), 0);
    assert!(markers.finish().is_empty());
}

#[test]
fn test_shared_handler_across_assertions() {
    let handler = CollectingHandler::new();
    let network = NetworkTelemetry::new(2);
    let context = MonitorContext::with_shared_handler(
        MonitorConfig::default(),
        Arc::new(handler.clone()) as Arc<dyn ViolationHandler>,
    );
    let _markers =
        assert_continuously_that_with(&network.marker_files_result(), context.clone())
            .have_no_marker_files();
    let _statuses = assert_continuously_that_with(&network.status_result(), context)
        .do_not_enter_any_statuses_of([PlatformStatus::Behind]);

    network.nodes()[0].write_marker_file(MarkerFile::CoinRound);
    network.nodes()[1].enter_status(PlatformStatus::Behind);
    assert_eq!(handler.len(), 2);
}

#[test]
fn test_panicking_handler_reports_on_delivering_thread() {
    let node = NodeTelemetry::standalone(NodeId(3));
    let _markers = assert_continuously_that_with(
        &node.marker_files_result(),
        MonitorContext::new(MonitorConfig::default(), PanickingHandler),
    )
    .have_no_marker_files();

    let message = panic_message(|| node.write_marker_file(MarkerFile::CoinRound)).unwrap();
    assert!(message.contains("no marker files failed: node-3 wrote marker file coin-round"));
}
