//! Continuous assertions under concurrent delivery and control.

#![allow(clippy::unwrap_used, missing_docs)]

use roundwatch_core::MarkerFile;
use roundwatch_testkit::{init_test_tracing, NetworkTelemetry, RoundHistoryFactory};
use roundwatch_verify::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const PRODUCERS_PER_NODE: usize = 3;

#[test]
fn test_control_operations_race_with_delivery() {
    init_test_tracing();
    let network = NetworkTelemetry::new(4);
    let logs = assert_continuously_that(&network.logs_result()).have_no_error_level_messages();
    let done = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(network.nodes().len() * PRODUCERS_PER_NODE + 1));

    let producers: Vec<_> = network
        .nodes()
        .iter()
        .flat_map(|node| {
            (0..PRODUCERS_PER_NODE).map(move |producer| (Arc::clone(node), producer))
        })
        .map(|(node, producer)| {
            let barrier = Arc::clone(&barrier);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                barrier.wait();
                let mut sent = 0usize;
                while !done.load(Ordering::Acquire) || sent < 200 {
                    let line = format!("producer {producer} line {sent}");
                    node.log_message(LogLevel::Info, None, &line);
                    sent += 1;
                }
                sent
            })
        })
        .collect();

    barrier.wait();
    for i in 0..200u64 {
        match i % 4 {
            0 => {
                logs.pause();
            }
            1 => {
                logs.resume();
            }
            2 => logs.start_suppressing_node(NodeId(i / 4 % 4)),
            _ => logs.stop_suppressing_node(NodeId(i / 4 % 4)),
        }
    }
    done.store(true, Ordering::Release);
    let sent: usize = producers.into_iter().map(|handle| handle.join().unwrap()).sum();

    assert!(sent >= network.nodes().len() * PRODUCERS_PER_NODE * 200);
    logs.resume();
    logs.assert_no_violations();
    assert_eq!(logs.state(), AssertionState::Active);
}

#[test]
fn test_violations_from_all_producers_are_collected() {
    let network = NetworkTelemetry::new(3);
    let rounds = assert_continuously_that(&network.rounds_result()).have_equal_rounds();
    let markers = assert_continuously_that(&network.marker_files_result()).have_no_marker_files();
    let history = RoundHistoryFactory::new().build(50);

    let handles: Vec<_> = network
        .nodes()
        .iter()
        .map(|node| {
            let node = Arc::clone(node);
            let history = history.clone();
            thread::spawn(move || {
                for chunk in history.chunks(7) {
                    node.deliver_rounds(chunk.to_vec());
                }
                if node.id() == NodeId(2) {
                    node.write_marker_file(MarkerFile::NoJudges);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    rounds.assert_no_violations();
    let violations = markers.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].node(), Some(NodeId(2)));
}

#[test]
fn test_destroy_while_delivering_stops_all_subscriptions() {
    let network = NetworkTelemetry::new(2);
    let statuses = assert_continuously_that(&network.status_result())
        .do_not_enter_any_statuses_of([PlatformStatus::CatastrophicFailure])
        .do_only_enter_statuses_of([PlatformStatus::Active, PlatformStatus::Behind]);
    assert_eq!(network.feeds().subscriber_count(), 2);

    let handles: Vec<_> = network
        .nodes()
        .iter()
        .map(|node| {
            let node = Arc::clone(node);
            thread::spawn(move || {
                for i in 0..500 {
                    let status = if i % 2 == 0 {
                        PlatformStatus::Active
                    } else {
                        PlatformStatus::Behind
                    };
                    node.enter_status(status);
                }
            })
        })
        .collect();
    statuses.destroy();
    for handle in handles {
        handle.join().unwrap();
    }

    network.nodes()[0].enter_status(PlatformStatus::CatastrophicFailure);
    assert_eq!(network.feeds().subscriber_count(), 0);
    statuses.assert_no_violations();
}
