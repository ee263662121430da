//! Platform status samples

use crate::identifiers::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a node within the consensus protocol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlatformStatus {
    /// Process is starting
    StartingUp,
    /// Replaying events from the preconsensus stream
    ReplayingEvents,
    /// Observing the network before participating
    Observing,
    /// Checking that its own events reach consensus
    Checking,
    /// Fully participating
    Active,
    /// Fallen behind the network and needs a reconnect
    Behind,
    /// A reconnect has completed
    ReconnectComplete,
    /// Freeze period in progress
    Freezing,
    /// Freeze completed, node is idle
    FreezeComplete,
    /// Unrecoverable failure
    CatastrophicFailure,
}

impl PlatformStatus {
    /// All statuses in declaration order
    pub const ALL: [PlatformStatus; 10] = [
        PlatformStatus::StartingUp,
        PlatformStatus::ReplayingEvents,
        PlatformStatus::Observing,
        PlatformStatus::Checking,
        PlatformStatus::Active,
        PlatformStatus::Behind,
        PlatformStatus::ReconnectComplete,
        PlatformStatus::Freezing,
        PlatformStatus::FreezeComplete,
        PlatformStatus::CatastrophicFailure,
    ];

    /// Upper-case name as written in node logs
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformStatus::StartingUp => "STARTING_UP",
            PlatformStatus::ReplayingEvents => "REPLAYING_EVENTS",
            PlatformStatus::Observing => "OBSERVING",
            PlatformStatus::Checking => "CHECKING",
            PlatformStatus::Active => "ACTIVE",
            PlatformStatus::Behind => "BEHIND",
            PlatformStatus::ReconnectComplete => "RECONNECT_COMPLETE",
            PlatformStatus::Freezing => "FREEZING",
            PlatformStatus::FreezeComplete => "FREEZE_COMPLETE",
            PlatformStatus::CatastrophicFailure => "CATASTROPHIC_FAILURE",
        }
    }
}

impl fmt::Display for PlatformStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status change reported by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusObservation {
    /// Reporting node
    pub node: NodeId,
    /// Status the node entered
    pub status: PlatformStatus,
}

impl StatusObservation {
    /// Create an observation
    pub fn new(node: NodeId, status: PlatformStatus) -> Self {
        Self { node, status }
    }
}
