//! # Measurement Records
//!
//! The host pipeline's data model as seen by the moving average transform.
//!
//! A [`MetricRecord`] is one observation of a time series: a [`MetricIdentity`]
//! naming the series plus an ordered list of [`DataSource`]s. Each data source
//! carries a name and a typed [`Value`]; the variant of the value is the data
//! source's [`DataSourceKind`].
//!
//! The shape of a record (how many data sources, in which order) is fixed per
//! metric identity. Transforms rely on this to correlate slot `i` of one record
//! with slot `i` of the next record of the same series.
//!
//! All types are `serde`-serializable so hosts can exchange records as JSON:
//!
//! ```rust
//! use sma_target::record::{DataSource, MetricIdentity, MetricRecord};
//!
//! let record = MetricRecord::new(MetricIdentity::new("web01", "interface", "if_octets"))
//!   .with_source(DataSource::gauge("rx", 1200.0))
//!   .with_source(DataSource::gauge("tx", 800.0));
//!
//! let json = serde_json::to_string(&record).unwrap();
//! let back: MetricRecord = serde_json::from_str(&json).unwrap();
//! assert_eq!(record, back);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one logical time series.
///
/// Two records belong to the same series exactly when their identities are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MetricIdentity {
  /// Host the measurement was taken on.
  pub host: String,
  /// Plugin that produced the measurement.
  pub plugin: String,
  /// Optional plugin instance (e.g. an interface name).
  #[serde(default)]
  pub plugin_instance: String,
  /// Type of the measurement, which fixes the data source layout.
  #[serde(rename = "type")]
  pub type_name: String,
  /// Optional type instance.
  #[serde(default)]
  pub type_instance: String,
}

impl MetricIdentity {
  /// Creates an identity with empty plugin and type instances.
  pub fn new(
    host: impl Into<String>,
    plugin: impl Into<String>,
    type_name: impl Into<String>,
  ) -> Self {
    Self {
      host: host.into(),
      plugin: plugin.into(),
      plugin_instance: String::new(),
      type_name: type_name.into(),
      type_instance: String::new(),
    }
  }

  /// Sets the plugin instance.
  pub fn with_plugin_instance(mut self, plugin_instance: impl Into<String>) -> Self {
    self.plugin_instance = plugin_instance.into();
    self
  }

  /// Sets the type instance.
  pub fn with_type_instance(mut self, type_instance: impl Into<String>) -> Self {
    self.type_instance = type_instance.into();
    self
  }
}

impl fmt::Display for MetricIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.host, self.plugin)?;
    if !self.plugin_instance.is_empty() {
      write!(f, "-{}", self.plugin_instance)?;
    }
    write!(f, "/{}", self.type_name)?;
    if !self.type_instance.is_empty() {
      write!(f, "-{}", self.type_instance)?;
    }
    Ok(())
  }
}

/// The kind of a data source.
///
/// Only [`DataSourceKind::Gauge`] holds an instantaneous value that can be
/// meaningfully averaged. The other kinds are cumulative or rate-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
  /// Instantaneous floating point value.
  Gauge,
  /// Monotonically increasing unsigned counter.
  Counter,
  /// Signed counter that may be reset.
  Derive,
  /// Counter that is reset on every read.
  Absolute,
}

impl fmt::Display for DataSourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      DataSourceKind::Gauge => "gauge",
      DataSourceKind::Counter => "counter",
      DataSourceKind::Derive => "derive",
      DataSourceKind::Absolute => "absolute",
    };
    f.write_str(name)
  }
}

/// A typed data source value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
  /// Gauge reading.
  Gauge(f64),
  /// Counter reading.
  Counter(u64),
  /// Derive reading.
  Derive(i64),
  /// Absolute reading.
  Absolute(u64),
}

impl Value {
  /// Returns the kind of this value.
  pub fn kind(&self) -> DataSourceKind {
    match self {
      Value::Gauge(_) => DataSourceKind::Gauge,
      Value::Counter(_) => DataSourceKind::Counter,
      Value::Derive(_) => DataSourceKind::Derive,
      Value::Absolute(_) => DataSourceKind::Absolute,
    }
  }

  /// Returns the gauge reading, or `None` for every other kind.
  pub fn as_gauge(&self) -> Option<f64> {
    match self {
      Value::Gauge(value) => Some(*value),
      _ => None,
    }
  }
}

/// One named field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
  /// Data source name, e.g. `"value"`, `"rx"` or `"tx"`.
  pub name: String,
  /// Current value.
  pub value: Value,
}

impl DataSource {
  /// Creates a data source.
  pub fn new(name: impl Into<String>, value: Value) -> Self {
    Self {
      name: name.into(),
      value,
    }
  }

  /// Creates a gauge data source.
  pub fn gauge(name: impl Into<String>, value: f64) -> Self {
    Self::new(name, Value::Gauge(value))
  }

  /// Creates a counter data source.
  pub fn counter(name: impl Into<String>, value: u64) -> Self {
    Self::new(name, Value::Counter(value))
  }

  /// Returns the kind of this data source.
  pub fn kind(&self) -> DataSourceKind {
    self.value.kind()
  }
}

/// A single observation of a metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
  /// The series this record belongs to.
  pub identity: MetricIdentity,
  /// Data sources in slot order.
  pub sources: Vec<DataSource>,
}

impl MetricRecord {
  /// Creates a record without data sources.
  pub fn new(identity: MetricIdentity) -> Self {
    Self {
      identity,
      sources: Vec::new(),
    }
  }

  /// Appends a data source as the next slot.
  pub fn with_source(mut self, source: DataSource) -> Self {
    self.sources.push(source);
    self
  }

  /// Number of data source slots.
  pub fn len(&self) -> usize {
    self.sources.len()
  }

  /// Returns `true` if the record has no data sources.
  pub fn is_empty(&self) -> bool {
    self.sources.is_empty()
  }

  /// Looks up a data source value by exact name.
  pub fn value(&self, name: &str) -> Option<Value> {
    self
      .sources
      .iter()
      .find(|source| source.name == name)
      .map(|source| source.value)
  }
}
