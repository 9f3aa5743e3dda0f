//! # Error Handling
//!
//! Errors raised while setting up the moving average transform, plus the
//! component identification used in diagnostics.
//!
//! ## Overview
//!
//! - **ConfigError**: the options tree handed over by the host is malformed. Raised
//!   synchronously by [`SmaConfig::resolve`](crate::config::SmaConfig::resolve); no
//!   transformer is ever built from a configuration that failed.
//! - **StateError**: lives next to the state store in
//!   [`stateful_transformer`](crate::stateful_transformer), since it describes
//!   failures of per-series window state at record time.
//! - **ComponentInfo**: name and type of a component, attached to log events.
//!
//! Per-record failures never escape `apply`: the transform degrades to passing the
//! record through unmodified and reports what happened through `tracing`.

use std::fmt;
use thiserror::Error;

/// Error produced while resolving the transform's configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  /// An option was given the wrong number or type of arguments.
  #[error("sma target: the `{option}' option {reason}")]
  InvalidArgument {
    /// The option key as written in the options tree.
    option: String,
    /// What was wrong with its arguments.
    reason: String,
  },
  /// The options tree itself could not be decoded.
  #[error("sma target: malformed options tree: {0}")]
  Malformed(String),
}

impl ConfigError {
  pub(crate) fn invalid_argument(option: &str, reason: impl Into<String>) -> Self {
    ConfigError::InvalidArgument {
      option: option.to_string(),
      reason: reason.into(),
    }
  }
}

impl From<serde_json::Error> for ConfigError {
  fn from(error: serde_json::Error) -> Self {
    ConfigError::Malformed(error.to_string())
  }
}

/// Information about a pipeline component.
///
/// Identifies a component by name and type in logs and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInfo {
  /// The name of the component.
  pub name: String,
  /// The type name of the component.
  pub type_name: String,
}

impl Default for ComponentInfo {
  fn default() -> Self {
    Self {
      name: "default".to_string(),
      type_name: "default".to_string(),
    }
  }
}

impl ComponentInfo {
  /// Creates a new `ComponentInfo` with the given name and type name.
  pub fn new(name: String, type_name: String) -> Self {
    Self { name, type_name }
  }
}

impl fmt::Display for ComponentInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.name, self.type_name)
  }
}
