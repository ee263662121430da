//! Roundwatch Core - Observation Model
//!
//! Immutable value types describing what a node of a gossip-based BFT network
//! reports while a test runs. The verification layer (`roundwatch-verify`)
//! consumes these; nothing in this crate evaluates them.
//!
//! ## Observations
//! - `ConsensusRound` / `PlatformEvent`: ordered consensus output of one node
//! - `PlatformStatus`: lifecycle phase samples
//! - `ReconnectNotification`: reconnect start / failure / completion
//! - `MarkerFilesStatus`: marker files a node has written (coin round, ISS, ...)
//! - `StructuredLog`: one log record with level and optional marker
//!
//! ## Ambient
//! - `errors`: unified `RoundwatchError` and `Result`
//! - `config`: `MonitorConfig` loaded from TOML and `ROUNDWATCH_*` variables

#![forbid(unsafe_code)]

/// Node identifiers
pub mod identifiers;

/// Observation value types
pub mod types;

/// Unified error handling
pub mod errors;

/// Monitor configuration
pub mod config;

pub use config::{MonitorConfig, ViolationPolicy};
pub use errors::{Result, RoundwatchError};
pub use identifiers::{NodeId, NodeLabel};
pub use types::{
    ConsensusRound, EventDescriptor, IssType, LogLevel, MarkerFile, MarkerFilesObservation,
    MarkerFilesStatus, PlatformEvent, PlatformStatus, ReconnectNotification, Round, RoundBatch,
    StatusObservation, StructuredLog, Timestamp,
};
