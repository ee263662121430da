#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]
//! # Roundwatch Verify - Assertions over Node Telemetry
//!
//! Checks the consensus output and operational telemetry that nodes of a
//! gossip-based BFT network report while a test runs.
//!
//! ## Architecture
//!
//! - **results**: collaborator traits exposing snapshots and live subscriptions
//! - **subscription**: `Continue` / `Unsubscribe` callback contract
//! - **rounds**: round validation, cross-node agreement and round diffs
//! - **status**: status progression matching and status set membership
//! - **reconnect**, **markers**, **logs**: per-observation predicates
//! - **assertions**: one-shot `assert_that` over snapshots
//! - **continuous**: live `assert_continuously_that` monitors with
//!   pause / resume / destroy and node or log-marker suppression
//!
//! ## Failure Reporting
//!
//! Every check reports a [`Violation`] with a multi-line message naming the
//! node, the expected and the actual values. One-shot assertions panic with
//! that message; continuous assertions hand it to a [`ViolationHandler`] and
//! keep monitoring unless the configured policy destroys them.
//!
//! ## Concurrency
//!
//! Nothing here spawns threads. Continuous checks run on whichever producer
//! thread delivers an observation. Lifecycle and suppression state is lock-free
//! to read; per-check state is owned by the subscriber callback.

pub mod assertions;
pub mod continuous;
pub mod logs;
pub mod markers;
pub mod reconnect;
pub mod results;
pub mod rounds;
pub mod status;
pub mod subscription;
pub mod violation;

// Prelude
pub mod prelude;

pub use assertions::{assert_that, ResultAssert};
pub use continuous::{
    assert_continuously_that, assert_continuously_that_with, AssertionState, CollectingHandler,
    ContinuousAssert, MonitorContext, PanickingHandler, ViolationHandler,
};
pub use results::{
    MultiNodeConsensusRounds, MultiNodeLogs, MultiNodeMarkerFiles, MultiNodePlatformStatus,
    MultiNodeReconnects, NodeConsensusRounds, NodeLogs, NodeMarkerFiles, NodePlatformStatus,
    NodeReconnects,
};
pub use status::{target, StatusProgression, StatusProgressionStep};
pub use subscription::{Subscriber, SubscriberAction};
pub use violation::{ProgressionError, Violation};
