//! Monitor configuration
//!
//! Limits and policies shared by continuous monitors. Values come from
//! defaults, a TOML file, and `ROUNDWATCH_*` environment variables, applied
//! in that order.

mod validation;

pub use validation::{ConfigValidator, ValidationError};

use crate::errors::{Result, RoundwatchError};
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Prefix of environment variables read by [`MonitorConfig::merge_with_env`]
pub const ENV_PREFIX: &str = "ROUNDWATCH_";

/// What a continuous monitor does after reporting a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
    /// Report and keep evaluating later observations
    #[default]
    KeepMonitoring,
    /// Report, then destroy the assertion
    DestroyOnViolation,
}

impl FromStr for ViolationPolicy {
    type Err = RoundwatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep_monitoring" | "keep" => Ok(ViolationPolicy::KeepMonitoring),
            "destroy_on_violation" | "destroy" => Ok(ViolationPolicy::DestroyOnViolation),
            other => Err(RoundwatchError::invalid(format!(
                "unknown violation policy '{other}'"
            ))),
        }
    }
}

/// Configuration for continuous monitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Longest acceptable reconnect, in seconds
    pub max_reconnect_secs: u64,
    /// Longest acceptable state-tree initialization during reconnect, in seconds
    pub max_tree_initialization_secs: u64,
    /// Highest log level that is not a violation
    pub max_log_level: LogLevel,
    /// Log markers that must never appear
    pub forbidden_log_markers: Vec<String>,
    /// Behavior after a violation
    pub violation_policy: ViolationPolicy,
    /// Round numbers kept for cross-node agreement, counted back from the
    /// highest round seen. Reports older than that are no longer compared.
    pub agreement_window_rounds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_reconnect_secs: 60,
            max_tree_initialization_secs: 30,
            max_log_level: LogLevel::Warn,
            forbidden_log_markers: Vec::new(),
            violation_policy: ViolationPolicy::KeepMonitoring,
            agreement_window_rounds: 1024,
        }
    }
}

impl MonitorConfig {
    /// Longest acceptable reconnect
    pub fn max_reconnect_time(&self) -> Duration {
        Duration::from_secs(self.max_reconnect_secs)
    }

    /// Longest acceptable tree initialization
    pub fn max_tree_initialization_time(&self) -> Duration {
        Duration::from_secs(self.max_tree_initialization_secs)
    }

    /// Parse a configuration from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MonitorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RoundwatchError::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded monitor configuration");
        Ok(config)
    }

    /// Override fields from `ROUNDWATCH_*` environment variables
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Override fields from `(name, value)` pairs named like environment variables.
    ///
    /// `self` is only updated when every override parses and the result validates.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = self.clone();
        for (key, value) in vars {
            let Some(field) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match field {
                "MAX_RECONNECT_SECS" => merged.max_reconnect_secs = parse_u64(&key, &value)?,
                "MAX_TREE_INIT_SECS" => {
                    merged.max_tree_initialization_secs = parse_u64(&key, &value)?;
                }
                "MAX_LOG_LEVEL" => merged.max_log_level = value.parse()?,
                "VIOLATION_POLICY" => merged.violation_policy = value.parse()?,
                "AGREEMENT_WINDOW_ROUNDS" => {
                    merged.agreement_window_rounds = parse_u64(&key, &value)?;
                }
                "FORBIDDEN_LOG_MARKERS" => {
                    merged.forbidden_log_markers = value
                        .split(',')
                        .map(str::trim)
                        .filter(|marker| !marker.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => {
                    tracing::debug!(variable = %key, "Ignoring unknown roundwatch variable");
                    continue;
                }
            }
            tracing::debug!(variable = %key, "Applied configuration override");
        }
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let mut validator = ConfigValidator::new();
        validator
            .at_least("max_reconnect_secs", self.max_reconnect_secs as f64, 1.0)
            .at_least(
                "max_tree_initialization_secs",
                self.max_tree_initialization_secs as f64,
                1.0,
            )
            .ensure(
                "max_tree_initialization_secs",
                self.max_tree_initialization_secs <= self.max_reconnect_secs,
                "must not exceed max_reconnect_secs",
            )
            .at_least(
                "agreement_window_rounds",
                self.agreement_window_rounds as f64,
                1.0,
            )
            .ensure(
                "forbidden_log_markers",
                self.forbidden_log_markers.iter().all(|m| !m.is_empty()),
                "markers must be non-empty",
            );
        validator.finish()
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| RoundwatchError::config(format!("{key}: expected a number, got '{value}' ({e})")))
}
