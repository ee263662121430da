//! Observation value types
//!
//! All types here are produced by the telemetry collaborator, handed over by
//! value and never mutated by the verification layer.

mod logs;
mod markers;
mod reconnect;
mod round;
mod status;

pub use logs::{LogLevel, StructuredLog};
pub use markers::{IssType, MarkerFile, MarkerFilesObservation, MarkerFilesStatus};
pub use reconnect::ReconnectNotification;
pub use round::{ConsensusRound, EventDescriptor, PlatformEvent, Round, RoundBatch, Timestamp};
pub use status::{PlatformStatus, StatusObservation};
