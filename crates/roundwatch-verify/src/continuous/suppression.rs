//! Suppression registries
//!
//! Nodes and log markers excluded from evaluation. Both sets are concurrent
//! maps sharded by key, so delivery threads reading membership do not block
//! the control thread changing it. A change applies to observations delivered
//! after it; observations already in flight may still see the old set.

use dashmap::DashSet;
use roundwatch_core::NodeId;
use std::borrow::Borrow;
use std::hash::Hash;

/// Concurrent set of suppressed keys.
#[derive(Debug)]
pub struct SuppressionRegistry<K: Eq + Hash> {
    entries: DashSet<K>,
}

impl<K: Eq + Hash> Default for SuppressionRegistry<K> {
    fn default() -> Self {
        Self {
            entries: DashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> SuppressionRegistry<K> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start suppressing `key`. Returns whether it was newly added.
    pub fn start(&self, key: K) -> bool {
        self.entries.insert(key)
    }

    /// Stop suppressing `key`. Returns whether it was present.
    pub fn stop<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).is_some()
    }

    /// Whether `key` is suppressed
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    /// Number of suppressed keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is suppressed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the suppressed keys
    pub fn snapshot(&self) -> Vec<K> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

/// Node and log-marker suppressions of one continuous assertion.
#[derive(Debug, Default)]
pub struct Suppressions {
    nodes: SuppressionRegistry<NodeId>,
    log_markers: SuppressionRegistry<String>,
}

impl Suppressions {
    /// Create empty registries
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppressed nodes
    pub fn nodes(&self) -> &SuppressionRegistry<NodeId> {
        &self.nodes
    }

    /// Suppressed log markers
    pub fn log_markers(&self) -> &SuppressionRegistry<String> {
        &self.log_markers
    }

    /// Whether observations from `node` are ignored. Unknown nodes are never suppressed.
    pub fn is_node_suppressed(&self, node: Option<NodeId>) -> bool {
        node.is_some_and(|node| self.nodes.contains(&node))
    }

    /// Whether a log line with `marker` is ignored
    pub fn is_log_marker_suppressed(&self, marker: Option<&str>) -> bool {
        marker.is_some_and(|marker| self.log_markers.contains(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_round_trip() {
        let suppressions = Suppressions::new();
        assert!(!suppressions.is_node_suppressed(Some(NodeId(1))));
        assert!(suppressions.nodes().start(NodeId(1)));
        assert!(!suppressions.nodes().start(NodeId(1)));
        assert!(suppressions.is_node_suppressed(Some(NodeId(1))));
        assert!(!suppressions.is_node_suppressed(None));
        assert!(suppressions.nodes().stop(&NodeId(1)));
        assert!(!suppressions.nodes().stop(&NodeId(1)));
        assert!(!suppressions.is_node_suppressed(Some(NodeId(1))));
    }

    #[test]
    fn test_log_markers() {
        let suppressions = Suppressions::new();
        suppressions.log_markers().start("RECONNECT".to_string());
        assert!(suppressions.is_log_marker_suppressed(Some("RECONNECT")));
        assert!(!suppressions.is_log_marker_suppressed(Some("EXCEPTION")));
        assert!(!suppressions.is_log_marker_suppressed(None));
    }

    #[test]
    fn test_concurrent_updates() {
        let registry = Arc::new(SuppressionRegistry::<NodeId>::new());
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        registry.start(NodeId(t * 100 + i));
                        let _ = registry.contains(&NodeId(i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 400);
    }
}
