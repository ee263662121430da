//! Where continuous violations go

use crate::violation::Violation;
use parking_lot::Mutex;
use roundwatch_core::MonitorConfig;
use std::fmt;
use std::sync::Arc;

/// Receives violations raised by continuous assertions.
///
/// Called on the delivering thread, once per violation.
pub trait ViolationHandler: Send + Sync {
    /// Handle one violation raised by `assertion`
    fn on_violation(&self, assertion: &str, violation: &Violation);

    /// Violations retained by this handler, if it keeps any
    fn recorded(&self) -> Vec<Violation> {
        Vec::new()
    }
}

/// Keeps every violation for the test to inspect.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    violations: Arc<Mutex<Vec<Violation>>>,
}

impl CollectingHandler {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of violations collected
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    /// Whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// Remove and return everything collected so far
    pub fn take(&self) -> Vec<Violation> {
        std::mem::take(&mut *self.violations.lock())
    }
}

impl fmt::Debug for CollectingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectingHandler")
            .field("violations", &self.len())
            .finish()
    }
}

impl ViolationHandler for CollectingHandler {
    fn on_violation(&self, assertion: &str, violation: &Violation) {
        tracing::error!(
            assertion,
            code = violation.code(),
            node = ?violation.node(),
            "{violation}"
        );
        self.violations.lock().push(violation.clone());
    }

    fn recorded(&self) -> Vec<Violation> {
        self.violations.lock().clone()
    }
}

/// Panics on the delivering thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingHandler;

impl ViolationHandler for PanickingHandler {
    fn on_violation(&self, assertion: &str, violation: &Violation) {
        panic!("{assertion} failed: {violation}");
    }
}

/// Configuration and violation sink shared by the checks of one assertion.
#[derive(Clone)]
pub struct MonitorContext {
    config: MonitorConfig,
    handler: Arc<dyn ViolationHandler>,
}

impl MonitorContext {
    /// Create a context
    pub fn new(config: MonitorConfig, handler: impl ViolationHandler + 'static) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Create a context with a shared handler
    pub fn with_shared_handler(config: MonitorConfig, handler: Arc<dyn ViolationHandler>) -> Self {
        Self { config, handler }
    }

    /// Monitor configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Violation handler
    pub fn handler(&self) -> &Arc<dyn ViolationHandler> {
        &self.handler
    }
}

impl Default for MonitorContext {
    fn default() -> Self {
        Self::new(MonitorConfig::default(), CollectingHandler::new())
    }
}

impl fmt::Debug for MonitorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
