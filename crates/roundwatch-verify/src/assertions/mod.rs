//! One-shot assertions
//!
//! `assert_that(&result)` evaluates a snapshot of what a result has observed
//! so far and panics with the violation message on the first failure. The
//! pure checkers behind every method are public in their domain modules for
//! callers that want a `Result` instead of a panic.
//!
//! Single-node subjects use `has_*` methods, multi-node subjects `have_*`.

mod logs;
mod markers;
mod reconnect;
mod rounds;
mod status;

use crate::violation::Violation;
use std::fmt;
use std::sync::Arc;

/// Snapshot assertions over a result.
pub struct ResultAssert<'a, S: ?Sized> {
    subject: &'a S,
}

/// Start one-shot assertions on `subject`.
pub fn assert_that<S: ?Sized>(subject: &Arc<S>) -> ResultAssert<'_, S> {
    ResultAssert {
        subject: subject.as_ref(),
    }
}

impl<'a, S: ?Sized> ResultAssert<'a, S> {
    /// The asserted result
    pub fn subject(&self) -> &'a S {
        self.subject
    }
}

impl<S: ?Sized> Clone for ResultAssert<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for ResultAssert<'_, S> {}

impl<S: ?Sized> fmt::Debug for ResultAssert<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultAssert").finish_non_exhaustive()
    }
}

/// Panic with the rendered violation.
#[track_caller]
fn fail(violation: Violation) -> ! {
    panic!("{violation}")
}

#[track_caller]
fn ensure(result: Result<(), Violation>) {
    if let Err(violation) = result {
        fail(violation);
    }
}
