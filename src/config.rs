//! # Configuration
//!
//! Resolves the moving average transform's settings from a host-parsed options tree.
//!
//! The host owns the configuration file syntax. What reaches this module is a tree
//! of [`ConfigItem`]s: each item has a key, a list of typed [`ConfigValue`]
//! arguments and nested children. The transform's block looks like
//!
//! ```text
//! <Target "sma">
//!   Window 5
//!   DataSource "rx" "tx"
//! </Target>
//! ```
//!
//! and arrives as a `ConfigItem` whose children are the `Window` and
//! `DataSource` options. [`SmaConfig::resolve`] turns it into an immutable
//! [`SmaConfig`].
//!
//! ## Options
//!
//! | option | effect | arguments |
//! |---|---|---|
//! | `Window` | number of samples averaged per data source (default 1) | exactly one positive integer, at most [`MAX_WINDOW_SIZE`] |
//! | `DataSource` | appends to the list of data sources to average (default: all) | one or more strings |
//!
//! Keys are matched case-insensitively. Unknown keys are logged and ignored so
//! newer host configurations keep working. A bad argument to a recognized option
//! aborts resolution with [`ConfigError::InvalidArgument`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use tracing::{debug, warn};

/// Key of the window size option.
pub const WINDOW_OPTION: &str = "Window";
/// Key of the data source list option.
pub const DATA_SOURCE_OPTION: &str = "DataSource";
/// Window size used when the `Window` option is absent.
pub const DEFAULT_WINDOW_SIZE: NonZeroUsize = NonZeroUsize::MIN;
/// Largest accepted window size.
pub const MAX_WINDOW_SIZE: usize = 1 << 20;

/// A single argument in the options tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
  /// A truth value.
  Boolean(bool),
  /// A number. The host tree does not distinguish integers from floats.
  Number(f64),
  /// A string.
  String(String),
}

impl ConfigValue {
  /// Human readable name of the argument's type, used in error messages.
  pub fn type_description(&self) -> &'static str {
    match self {
      ConfigValue::Boolean(_) => "truth value",
      ConfigValue::Number(_) => "number",
      ConfigValue::String(_) => "string",
    }
  }
}

impl From<bool> for ConfigValue {
  fn from(value: bool) -> Self {
    ConfigValue::Boolean(value)
  }
}

impl From<f64> for ConfigValue {
  fn from(value: f64) -> Self {
    ConfigValue::Number(value)
  }
}

impl From<&str> for ConfigValue {
  fn from(value: &str) -> Self {
    ConfigValue::String(value.to_string())
  }
}

impl From<String> for ConfigValue {
  fn from(value: String) -> Self {
    ConfigValue::String(value)
  }
}

/// A node of the host's options tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigItem {
  /// Option key.
  pub key: String,
  /// Arguments given to the option.
  #[serde(default)]
  pub values: Vec<ConfigValue>,
  /// Nested options.
  #[serde(default)]
  pub children: Vec<ConfigItem>,
}

impl ConfigItem {
  /// Creates an item without arguments or children.
  pub fn new(key: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      values: Vec::new(),
      children: Vec::new(),
    }
  }

  /// Appends an argument.
  pub fn with_value(mut self, value: impl Into<ConfigValue>) -> Self {
    self.values.push(value.into());
    self
  }

  /// Appends a nested option.
  pub fn with_child(mut self, child: ConfigItem) -> Self {
    self.children.push(child);
    self
  }

  /// Decodes an options tree from JSON.
  ///
  /// ```rust
  /// use sma_target::config::ConfigItem;
  ///
  /// let item = ConfigItem::from_json(
  ///   r#"{"key": "sma", "children": [{"key": "Window", "values": [3]}]}"#,
  /// )
  /// .unwrap();
  /// assert_eq!(item.children[0].key, "Window");
  /// ```
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(json)?)
  }
}

/// Resolved, immutable settings of the moving average transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SmaConfig {
  window_size: NonZeroUsize,
  data_sources: Vec<String>,
}

impl Default for SmaConfig {
  fn default() -> Self {
    Self {
      window_size: DEFAULT_WINDOW_SIZE,
      data_sources: Vec::new(),
    }
  }
}

impl SmaConfig {
  /// Creates a configuration averaging every data source over `window_size` samples.
  ///
  /// Returns [`ConfigError::InvalidArgument`] if `window_size` is zero or larger
  /// than [`MAX_WINDOW_SIZE`].
  pub fn new(window_size: usize) -> Result<Self, ConfigError> {
    if window_size > MAX_WINDOW_SIZE {
      return Err(window_too_large(WINDOW_OPTION, window_size));
    }
    let window_size = NonZeroUsize::new(window_size).ok_or_else(|| {
      ConfigError::invalid_argument(WINDOW_OPTION, "must be a positive integer (got 0)")
    })?;
    Ok(Self {
      window_size,
      data_sources: Vec::new(),
    })
  }

  /// Restricts averaging to the named data source, in addition to any already listed.
  pub fn with_data_source(mut self, name: impl Into<String>) -> Self {
    self.data_sources.push(name.into());
    self
  }

  /// Number of samples averaged per data source.
  pub fn window_size(&self) -> usize {
    self.window_size.get()
  }

  /// Window size as a non-zero value, for allocating window state.
  pub fn window(&self) -> NonZeroUsize {
    self.window_size
  }

  /// Configured data source names. Empty means every data source is averaged.
  pub fn data_sources(&self) -> &[String] {
    &self.data_sources
  }

  /// Returns `true` if the data source called `name` is selected for averaging.
  ///
  /// Names are compared case-insensitively.
  pub fn matches(&self, name: &str) -> bool {
    self.data_sources.is_empty()
      || self
        .data_sources
        .iter()
        .any(|configured| configured.eq_ignore_ascii_case(name))
  }

  /// Resolves a configuration from the options block of the transform.
  ///
  /// Only `item.children` are inspected; the key and arguments of `item` itself
  /// belong to the host's block syntax.
  pub fn resolve(item: &ConfigItem) -> Result<Self, ConfigError> {
    let mut config = SmaConfig::default();

    for child in &item.children {
      if child.key.eq_ignore_ascii_case(WINDOW_OPTION) {
        config.window_size = parse_window(child)?;
      } else if child.key.eq_ignore_ascii_case(DATA_SOURCE_OPTION) {
        append_data_sources(&mut config.data_sources, child)?;
      } else {
        warn!(
          option = %child.key,
          "sma target: configuration option is not understood and will be ignored"
        );
      }
    }

    debug!(
      window_size = config.window_size.get(),
      data_sources = ?config.data_sources,
      "sma target: configuration resolved"
    );
    Ok(config)
  }
}

fn parse_window(item: &ConfigItem) -> Result<NonZeroUsize, ConfigError> {
  let number = match item.values.as_slice() {
    [ConfigValue::Number(number)] => *number,
    _ => {
      return Err(ConfigError::invalid_argument(
        &item.key,
        "needs exactly one numeric argument",
      ));
    }
  };

  if !number.is_finite() || number.fract() != 0.0 || number < 1.0 {
    return Err(ConfigError::invalid_argument(
      &item.key,
      format!("must be a positive integer (got {})", number),
    ));
  }
  if number > MAX_WINDOW_SIZE as f64 {
    return Err(window_too_large(&item.key, number));
  }

  NonZeroUsize::new(number as usize).ok_or_else(|| {
    ConfigError::invalid_argument(&item.key, format!("must be a positive integer (got {})", number))
  })
}

fn window_too_large(option: &str, got: impl std::fmt::Display) -> ConfigError {
  ConfigError::invalid_argument(
    option,
    format!("must not exceed {} (got {})", MAX_WINDOW_SIZE, got),
  )
}

fn append_data_sources(
  data_sources: &mut Vec<String>,
  item: &ConfigItem,
) -> Result<(), ConfigError> {
  if item.values.is_empty() {
    return Err(ConfigError::invalid_argument(
      &item.key,
      "needs at least one argument",
    ));
  }

  let mut names = Vec::with_capacity(item.values.len());
  for (index, value) in item.values.iter().enumerate() {
    match value {
      ConfigValue::String(name) => names.push(name.clone()),
      other => {
        return Err(ConfigError::invalid_argument(
          &item.key,
          format!(
            "accepts only string arguments (argument {} is a {})",
            index + 1,
            other.type_description()
          ),
        ));
      }
    }
  }

  data_sources.extend(names);
  Ok(())
}
