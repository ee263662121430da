//! Structured log checks

use crate::violation::Violation;
use roundwatch_core::{LogLevel, NodeId, NodeLabel, StructuredLog};
use std::collections::BTreeSet;

/// Fail if `log` is above `max`.
pub fn check_level_at_most(log: &StructuredLog, max: LogLevel) -> Result<(), Violation> {
    if log.level > max {
        return Err(Violation::LogLevelExceeded {
            node: NodeLabel(log.node),
            level: log.level,
            max,
            log: log.to_string(),
        });
    }
    Ok(())
}

/// Fail if `log` carries one of the `forbidden` markers.
pub fn check_markers(log: &StructuredLog, forbidden: &BTreeSet<String>) -> Result<(), Violation> {
    match &log.marker {
        Some(marker) if forbidden.contains(marker) => Err(Violation::ForbiddenLogMarker {
            node: NodeLabel(log.node),
            marker: marker.clone(),
            log: log.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Fail unless some line in `logs` contains `needle`.
pub fn check_contains_message(
    node: NodeId,
    logs: &[StructuredLog],
    needle: &str,
) -> Result<(), Violation> {
    if logs.iter().any(|log| log.message.contains(needle)) {
        return Ok(());
    }
    Err(Violation::MissingLogMessage {
        node,
        needle: needle.to_string(),
        searched: logs.len(),
    })
}
