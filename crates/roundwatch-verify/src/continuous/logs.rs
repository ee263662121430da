//! Continuous structured log checks
//!
//! Log lines whose marker is suppressed are skipped before any check runs.

use super::{ContinuousAssert, MonitorShared, Observable};
use crate::logs::{check_level_at_most, check_markers};
use crate::violation::Violation;
use roundwatch_core::{LogLevel, StructuredLog};
use std::collections::BTreeSet;
use tracing::trace;

fn unless_marker_suppressed(
    log: &StructuredLog,
    shared: &MonitorShared,
    check: impl FnOnce() -> Result<(), Violation>,
) -> Vec<Violation> {
    if shared
        .suppressions()
        .is_log_marker_suppressed(log.marker.as_deref())
    {
        trace!(marker = ?log.marker, "skipping suppressed log marker");
        return Vec::new();
    }
    check().err().into_iter().collect()
}

impl<S> ContinuousAssert<S>
where
    S: ?Sized + Observable<StructuredLog>,
{
    /// Fail on every line logged at `ERROR` or above.
    pub fn have_no_error_level_messages(self) -> Self {
        self.have_no_messages_with_level_higher_than(LogLevel::Warn)
    }

    /// Fail on every line logged above `level`.
    pub fn have_no_messages_with_level_higher_than(self, level: LogLevel) -> Self {
        self.register("log level ceiling", move |log: &StructuredLog, shared| {
            unless_marker_suppressed(log, shared, || check_level_at_most(log, level))
        })
    }

    /// Fail on every line carrying one of `markers`.
    pub fn have_no_message_with_markers<I, M>(self, markers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let forbidden: BTreeSet<String> = markers.into_iter().map(Into::into).collect();
        self.register("forbidden log markers", move |log: &StructuredLog, shared| {
            unless_marker_suppressed(log, shared, || check_markers(log, &forbidden))
        })
    }

    /// Apply the level ceiling and forbidden markers from the monitor configuration.
    pub fn have_logs_within_configured_limits(self) -> Self {
        let max = self.config().max_log_level;
        let forbidden: BTreeSet<String> =
            self.config().forbidden_log_markers.iter().cloned().collect();
        self.register("configured log limits", move |log: &StructuredLog, shared| {
            let mut violations =
                unless_marker_suppressed(log, shared, || check_level_at_most(log, max));
            violations.extend(unless_marker_suppressed(log, shared, || {
                check_markers(log, &forbidden)
            }));
            violations
        })
    }
}
