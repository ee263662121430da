//! Node identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one node in the network under test.
///
/// Totally ordered so that reference-node selection is deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a node identifier from its numeric value
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Display wrapper for a node that may not be known at emission time.
///
/// Renders `unknown` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeLabel(pub Option<NodeId>);

impl NodeLabel {
    /// The wrapped node, if known
    pub fn node(self) -> Option<NodeId> {
        self.0
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(node) => write!(f, "{node}"),
            None => write!(f, "unknown"),
        }
    }
}

impl From<Option<NodeId>> for NodeLabel {
    fn from(node: Option<NodeId>) -> Self {
        Self(node)
    }
}

impl From<NodeId> for NodeLabel {
    fn from(node: NodeId) -> Self {
        Self(Some(node))
    }
}
