use super::{ensure, ResultAssert};
use crate::logs::{check_contains_message, check_level_at_most, check_markers};
use crate::results::{MultiNodeLogs, NodeLogs};
use roundwatch_core::{LogLevel, StructuredLog};
use std::collections::BTreeSet;

fn marker_set<I, M>(markers: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = M>,
    M: Into<String>,
{
    markers.into_iter().map(Into::into).collect()
}

#[track_caller]
fn level_at_most(logs: &[StructuredLog], max: LogLevel) {
    for log in logs {
        ensure(check_level_at_most(log, max));
    }
}

#[track_caller]
fn without_markers(logs: &[StructuredLog], forbidden: &BTreeSet<String>) {
    for log in logs {
        ensure(check_markers(log, forbidden));
    }
}

impl ResultAssert<'_, dyn NodeLogs> {
    /// Nothing was logged at `ERROR` or above
    #[track_caller]
    pub fn has_no_error_level_messages(self) -> Self {
        self.has_no_messages_with_level_higher_than(LogLevel::Warn)
    }

    /// Nothing was logged above `level`
    #[track_caller]
    pub fn has_no_messages_with_level_higher_than(self, level: LogLevel) -> Self {
        level_at_most(&self.subject.logs(), level);
        self
    }

    /// No line carries one of `markers`
    #[track_caller]
    pub fn has_no_message_with_markers<I, M>(self, markers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        without_markers(&self.subject.logs(), &marker_set(markers));
        self
    }

    /// Some line contains `text`
    #[track_caller]
    pub fn has_message_containing(self, text: &str) -> Self {
        ensure(check_contains_message(
            self.subject.node_id(),
            &self.subject.logs(),
            text,
        ));
        self
    }
}

impl ResultAssert<'_, dyn MultiNodeLogs> {
    /// No node logged anything at `ERROR` or above
    #[track_caller]
    pub fn have_no_error_level_messages(self) -> Self {
        self.have_no_messages_with_level_higher_than(LogLevel::Warn)
    }

    /// No node logged anything above `level`
    #[track_caller]
    pub fn have_no_messages_with_level_higher_than(self, level: LogLevel) -> Self {
        for result in self.subject.results() {
            level_at_most(&result.logs(), level);
        }
        self
    }

    /// No node logged a line carrying one of `markers`
    #[track_caller]
    pub fn have_no_message_with_markers<I, M>(self, markers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let forbidden = marker_set(markers);
        for result in self.subject.results() {
            without_markers(&result.logs(), &forbidden);
        }
        self
    }

    /// Every node logged a line containing `text`
    #[track_caller]
    pub fn have_message_containing(self, text: &str) -> Self {
        for result in self.subject.results() {
            ensure(check_contains_message(result.node_id(), &result.logs(), text));
        }
        self
    }
}
