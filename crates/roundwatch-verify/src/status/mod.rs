//! Platform status checks
//!
//! - **progression**: ordered step automaton with required/optional interim statuses
//! - **membership**: forbidden and allowed status sets

pub mod membership;
pub mod progression;

pub use membership::{check_not_any_of, check_only};
pub use progression::{
    target, ProgressionMatcher, StatusProgression, StatusProgressionStep, OBSERVED_WINDOW,
};
