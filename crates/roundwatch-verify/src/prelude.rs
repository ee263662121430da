//! Roundwatch Verify prelude.
//!
//! Everything a test needs to assert on node results.

pub use crate::assertions::{assert_that, ResultAssert};
pub use crate::continuous::{
    assert_continuously_that, assert_continuously_that_with, AssertionState, CollectingHandler,
    ContinuousAssert, MonitorContext, PanickingHandler, ViolationHandler,
};
pub use crate::results::*;
pub use crate::status::{target, StatusProgression, StatusProgressionStep};
pub use crate::subscription::{Subscriber, SubscriberAction};
pub use crate::violation::{ProgressionError, Violation};
pub use roundwatch_core::{
    IssType, LogLevel, MonitorConfig, NodeId, PlatformStatus, Round, Timestamp, ViolationPolicy,
};
