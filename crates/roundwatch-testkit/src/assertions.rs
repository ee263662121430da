//! Assertion helpers for tests of the verification layer

use roundwatch_verify::Violation;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Assert that `violations` contains one with the given code
#[macro_export]
macro_rules! assert_violation {
    ($violations:expr, $code:expr) => {
        assert!(
            $violations.iter().any(|violation| violation.code() == $code),
            "expected a {} violation, found {:?}",
            $code,
            $violations
                .iter()
                .map(|violation| violation.code())
                .collect::<Vec<_>>()
        )
    };
}

/// Assert that no violation was collected
#[macro_export]
macro_rules! assert_no_violation {
    ($violations:expr) => {
        assert!(
            $violations.is_empty(),
            "expected no violations, found:\n{}",
            $violations
                .iter()
                .map(|violation| violation.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        )
    };
}

/// Run `f` and return its panic message, or `None` if it did not panic.
pub fn panic_message(f: impl FnOnce()) -> Option<String> {
    let payload = catch_unwind(AssertUnwindSafe(f)).err()?;
    if let Some(message) = payload.downcast_ref::<String>() {
        return Some(message.clone());
    }
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
}

/// Violations with the given code
pub fn with_code<'a>(violations: &'a [Violation], code: &str) -> Vec<&'a Violation> {
    violations
        .iter()
        .filter(|violation| violation.code() == code)
        .collect()
}
