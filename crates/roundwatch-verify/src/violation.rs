//! Assertion violations
//!
//! Every check in this crate reports failure as a [`Violation`]. The rendered
//! message is multi-line and names the node(s), the expected and actual
//! values, and the offending payload, so that a failure can be diagnosed
//! without re-running the test.

use roundwatch_core::{LogLevel, MarkerFile, NodeId, NodeLabel, PlatformStatus, Round, Timestamp};
use std::time::Duration;

/// Why an observed status sequence does not follow the expected steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    /// The target of a step was reached before all required interim statuses
    #[error("step {step} reached target {target} without required interim statuses {missing:?}")]
    MissingRequiredInterim {
        /// Zero-based step index
        step: usize,
        /// Target of the step
        target: PlatformStatus,
        /// Required statuses that were never observed
        missing: Vec<PlatformStatus>,
    },

    /// A status that is neither the target nor an allowed interim status
    #[error("unexpected status {status} in step {step} (target {target})")]
    UnexpectedStatus {
        /// Zero-based step index
        step: usize,
        /// Target of the step
        target: PlatformStatus,
        /// Offending status
        status: PlatformStatus,
    },

    /// A status arrived after every step had been matched
    #[error("more statuses than expected: {status} after all {steps} steps matched")]
    MoreStatusesThanExpected {
        /// Number of expected steps
        steps: usize,
        /// Offending status
        status: PlatformStatus,
    },

    /// The sequence ended before every step was matched
    #[error("fewer steps than expected: matched {matched} of {expected}")]
    FewerStepsThanExpected {
        /// Number of expected steps
        expected: usize,
        /// Number of steps matched
        matched: usize,
    },
}

/// A broken invariant or expectation detected in node telemetry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Round numbers did not strictly increase
    #[error(
        "Round numbers of {node} are not strictly increasing\n  previous round: {previous}\n  actual round:   {actual}"
    )]
    RoundNumberRegression {
        /// Reporting node
        node: NodeId,
        /// Round before the offending one
        previous: Round,
        /// Offending round
        actual: Round,
    },

    /// The ancient threshold decreased between successive rounds
    #[error(
        "Ancient threshold of {node} decreased in round {round}\n  expected: >= {expected_min} (round {previous_round})\n  actual:   {actual}"
    )]
    AncientThresholdRegression {
        /// Reporting node
        node: NodeId,
        /// Offending round
        round: Round,
        /// Round the threshold is compared against
        previous_round: Round,
        /// Threshold of the previous round
        expected_min: u64,
        /// Threshold of the offending round
        actual: u64,
    },

    /// Event creation times within a round did not strictly increase
    #[error(
        "Events of round {round} on {node} are not ordered by creation time\n  event #{index}: {event}\n  expected: created after {previous}\n  actual:   created at {actual}"
    )]
    EventTimeOrdering {
        /// Reporting node
        node: NodeId,
        /// Round containing the events
        round: Round,
        /// Index of the offending event within the round
        index: usize,
        /// Offending event
        event: String,
        /// Creation time of the preceding event
        previous: Timestamp,
        /// Creation time of the offending event
        actual: Timestamp,
    },

    /// An event's birth round is on the wrong side of a configuration split
    #[error(
        "Birth round split violated on {node} in round {round}\n  event:    {event}\n  expected: birth round {expected} (split at {split_time}, round {split_round})\n  actual:   birth round {actual}"
    )]
    BirthRoundSplit {
        /// Reporting node
        node: NodeId,
        /// Round containing the event
        round: Round,
        /// Offending event
        event: String,
        /// Split instant
        split_time: Timestamp,
        /// Split round
        split_round: Round,
        /// Expected relation, e.g. `<= 5`
        expected: String,
        /// Actual birth round
        actual: Round,
    },

    /// Two nodes disagree on the content of a round
    #[error("Consensus rounds of {reference} and {node} differ in round {round}\n{diff}")]
    RoundMismatch {
        /// Reference node
        reference: NodeId,
        /// Diverging node
        node: NodeId,
        /// Round number as reported by the reference
        round: Round,
        /// Human-readable difference
        diff: String,
    },

    /// The last round number is not the expected one
    #[error("Unexpected last round of {node}\n  expected: {expected}\n  actual:   {actual}")]
    LastRoundMismatch {
        /// Reporting node
        node: NodeId,
        /// Expected round number
        expected: Round,
        /// Actual round number, `none` if no rounds
        actual: String,
    },

    /// Consensus did not advance past a round
    #[error("Consensus of {node} has not advanced since round {since}\n  last round: {actual}")]
    NotAdvanced {
        /// Reporting node
        node: NodeId,
        /// Round that should have been passed
        since: Round,
        /// Actual last round, `none` if no rounds
        actual: String,
    },

    /// The status sequence does not follow the expected steps
    #[error("Platform status progression of {node} failed: {reason}\n  observed: {observed}")]
    StatusProgression {
        /// Reporting node
        node: NodeId,
        /// What went wrong
        reason: ProgressionError,
        /// Statuses observed so far
        observed: String,
    },

    /// A node entered a forbidden status
    #[error("{node} entered forbidden status {status}\n  forbidden: {forbidden}")]
    ForbiddenStatus {
        /// Reporting node
        node: NodeId,
        /// Offending status
        status: PlatformStatus,
        /// Forbidden set
        forbidden: String,
    },

    /// A node entered a status outside the allowed set
    #[error("{node} entered status {status} outside the allowed set\n  allowed: {allowed}")]
    StatusNotAllowed {
        /// Reporting node
        node: NodeId,
        /// Offending status
        status: PlatformStatus,
        /// Allowed set
        allowed: String,
    },

    /// A reconnect attempt failed
    #[error("Reconnect of {node} failed\n  payload: {payload}")]
    ReconnectFailed {
        /// Reconnecting node
        node: NodeLabel,
        /// Diagnostic payload
        payload: String,
    },

    /// A reconnect happened where none was expected
    #[error("Unexpected reconnect of {node}\n  notification: {kind}")]
    UnexpectedReconnect {
        /// Reconnecting node
        node: NodeLabel,
        /// Notification variant
        kind: &'static str,
    },

    /// A reconnect took too long
    #[error("Reconnect of {node} took too long\n  expected: <= {max:?}\n  actual:   {actual:?}")]
    ReconnectTooSlow {
        /// Reconnecting node
        node: NodeLabel,
        /// Measured duration
        actual: Duration,
        /// Limit
        max: Duration,
    },

    /// Tree initialization during a reconnect took too long
    #[error(
        "Tree initialization of {node} took too long\n  expected: <= {max:?}\n  actual:   {actual:?}"
    )]
    TreeInitializationTooSlow {
        /// Reconnecting node
        node: NodeLabel,
        /// Measured duration
        actual: Duration,
        /// Limit
        max: Duration,
    },

    /// The number of successful reconnects is off
    #[error("Unexpected number of successful reconnects of {node}\n  expected: {expected}\n  actual:   {actual}")]
    ReconnectCount {
        /// Reconnecting node
        node: NodeId,
        /// Expected count, e.g. `>= 2`
        expected: String,
        /// Actual count
        actual: usize,
    },

    /// A forbidden marker file is present
    #[error("{node} wrote marker file {marker}\n  marker files: {status}")]
    MarkerFilePresent {
        /// Reporting node
        node: NodeId,
        /// First forbidden marker found
        marker: MarkerFile,
        /// All markers present
        status: String,
    },

    /// A log line is above the allowed level
    #[error("{node} logged a message above {max}\n  level:   {level}\n  message: {log}")]
    LogLevelExceeded {
        /// Logging node
        node: NodeLabel,
        /// Level of the line
        level: LogLevel,
        /// Highest allowed level
        max: LogLevel,
        /// The full log line
        log: String,
    },

    /// A log line carries a forbidden marker
    #[error("{node} logged a message with forbidden marker {marker}\n  message: {log}")]
    ForbiddenLogMarker {
        /// Logging node
        node: NodeLabel,
        /// Offending marker
        marker: String,
        /// The full log line
        log: String,
    },

    /// No log line contains the expected text
    #[error("{node} never logged a message containing '{needle}'\n  lines searched: {searched}")]
    MissingLogMessage {
        /// Logging node
        node: NodeId,
        /// Expected text
        needle: String,
        /// Number of lines searched
        searched: usize,
    },
}

impl Violation {
    /// Node the violation originates from, if known.
    ///
    /// For round mismatches this is the diverging node, not the reference.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Violation::RoundNumberRegression { node, .. }
            | Violation::AncientThresholdRegression { node, .. }
            | Violation::EventTimeOrdering { node, .. }
            | Violation::BirthRoundSplit { node, .. }
            | Violation::RoundMismatch { node, .. }
            | Violation::LastRoundMismatch { node, .. }
            | Violation::NotAdvanced { node, .. }
            | Violation::StatusProgression { node, .. }
            | Violation::ForbiddenStatus { node, .. }
            | Violation::StatusNotAllowed { node, .. }
            | Violation::ReconnectCount { node, .. }
            | Violation::MarkerFilePresent { node, .. }
            | Violation::MissingLogMessage { node, .. } => Some(*node),
            Violation::ReconnectFailed { node, .. }
            | Violation::UnexpectedReconnect { node, .. }
            | Violation::ReconnectTooSlow { node, .. }
            | Violation::TreeInitializationTooSlow { node, .. }
            | Violation::LogLevelExceeded { node, .. }
            | Violation::ForbiddenLogMarker { node, .. } => node.node(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Violation::RoundNumberRegression { .. } => "round_number_regression",
            Violation::AncientThresholdRegression { .. } => "ancient_threshold_regression",
            Violation::EventTimeOrdering { .. } => "event_time_ordering",
            Violation::BirthRoundSplit { .. } => "birth_round_split",
            Violation::RoundMismatch { .. } => "round_mismatch",
            Violation::LastRoundMismatch { .. } => "last_round_mismatch",
            Violation::NotAdvanced { .. } => "not_advanced",
            Violation::StatusProgression { .. } => "status_progression",
            Violation::ForbiddenStatus { .. } => "forbidden_status",
            Violation::StatusNotAllowed { .. } => "status_not_allowed",
            Violation::ReconnectFailed { .. } => "reconnect_failed",
            Violation::UnexpectedReconnect { .. } => "unexpected_reconnect",
            Violation::ReconnectTooSlow { .. } => "reconnect_too_slow",
            Violation::TreeInitializationTooSlow { .. } => "tree_initialization_too_slow",
            Violation::ReconnectCount { .. } => "reconnect_count",
            Violation::MarkerFilePresent { .. } => "marker_file_present",
            Violation::LogLevelExceeded { .. } => "log_level_exceeded",
            Violation::ForbiddenLogMarker { .. } => "forbidden_log_marker",
            Violation::MissingLogMessage { .. } => "missing_log_message",
        }
    }
}

/// Render a sequence of values as `[A, B, C]`
pub(crate) fn render_list<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    let parts: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Render an optional round number, `none` if absent
pub(crate) fn render_round(round: Option<Round>) -> String {
    round.map_or_else(|| "none".to_string(), |r| r.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_node_placeholder_in_message() {
        let violation = Violation::ReconnectFailed {
            node: NodeLabel(None),
            payload: "timeout".to_string(),
        };
        assert_eq!(violation.node(), None);
        assert_eq!(
            violation.to_string(),
            "Reconnect of unknown failed\n  payload: timeout"
        );
    }

    #[test]
    fn test_ancient_regression_message_has_expected_and_actual() {
        let violation = Violation::AncientThresholdRegression {
            node: NodeId(1),
            round: 2,
            previous_round: 1,
            expected_min: 1,
            actual: 0,
        };
        let message = violation.to_string();
        assert!(message.contains("node-1"));
        assert!(message.contains("round 2"));
        assert!(message.contains("expected: >= 1"));
        assert!(message.contains("actual:   0"));
        assert_eq!(violation.code(), "ancient_threshold_regression");
    }

    #[test]
    fn test_progression_reason_rendered() {
        let violation = Violation::StatusProgression {
            node: NodeId(2),
            reason: ProgressionError::UnexpectedStatus {
                step: 0,
                target: PlatformStatus::Active,
                status: PlatformStatus::Behind,
            },
            observed: render_list([PlatformStatus::Behind]),
        };
        assert!(violation
            .to_string()
            .contains("unexpected status BEHIND in step 0 (target ACTIVE)"));
    }
}
