//! Roundwatch Testing Infrastructure
//!
//! In-memory node results and fixtures for exercising `roundwatch-verify`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use roundwatch_testkit::*;
//! use roundwatch_verify::prelude::*;
//!
//! let network = NetworkTelemetry::new(4);
//! let markers = assert_continuously_that(&network.marker_files_result())
//!     .have_no_iss_marker_files();
//! network.nodes()[0].write_iss_marker(IssType::SelfIss);
//! assert_eq!(markers.violations().len(), 1);
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod assertions;
pub mod factories;
pub mod feed;
pub mod logging;
pub mod strategies;
pub mod telemetry;

// Re-export commonly used items
pub use assertions::*;
pub use factories::*;
pub use feed::Feed;
pub use logging::init_test_tracing;
pub use telemetry::{NetworkTelemetry, NodeTelemetry, TelemetryFeeds};
