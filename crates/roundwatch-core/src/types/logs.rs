//! Structured log records

use crate::errors::RoundwatchError;
use crate::identifiers::{NodeId, NodeLabel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Finest detail
    Trace,
    /// Debugging detail
    Debug,
    /// Informational
    #[default]
    Info,
    /// Something unexpected but tolerated
    Warn,
    /// An error
    Error,
    /// An unrecoverable error
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = RoundwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            other => Err(RoundwatchError::invalid(format!("unknown log level '{other}'"))),
        }
    }
}

/// One structured log line emitted by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLog {
    /// Emission time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// Severity
    pub level: LogLevel,
    /// Marker/category tag
    pub marker: Option<String>,
    /// Originating node, if known
    pub node: Option<NodeId>,
    /// Emitting thread
    pub thread: String,
    /// Message text
    pub message: String,
}

impl StructuredLog {
    /// Create a log line without marker or thread name
    pub fn new(node: Option<NodeId>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp_ms: 0,
            level,
            marker: None,
            node,
            thread: String::new(),
            message: message.into(),
        }
    }

    /// Attach a marker
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Set the emission time
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

impl fmt::Display for StructuredLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {}",
            self.timestamp_ms,
            self.level,
            NodeLabel(self.node),
            self.marker.as_deref().unwrap_or("-")
        )?;
        if !self.thread.is_empty() {
            write!(f, " <{}>", self.thread)?;
        }
        write!(f, " {}", self.message)
    }
}
