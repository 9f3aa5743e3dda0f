//! Builder and per-record logic for the SmaTransformer.

use crate::config::{ConfigItem, SmaConfig};
use crate::error::ConfigError;
use crate::record::{DataSourceKind, MetricRecord, Value};
use crate::stateful_transformer::{KeyedStateStore, StateError, StateResult};
use crate::target::TargetAction;
use crate::transformer::TransformerConfig;
use crate::window::WindowStore;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A stateful transformer replacing gauge values with their simple moving average.
///
/// Every metric identity gets its own window of the last `window_size` samples per
/// data source. Until a window has been filled the missing samples count as zero,
/// so early averages are pulled toward zero.
///
/// # Example
///
/// ```rust
/// use sma_target::config::SmaConfig;
/// use sma_target::record::{DataSource, MetricIdentity, MetricRecord, Value};
/// use sma_target::transformers::sma::SmaTransformer;
///
/// let transformer = SmaTransformer::new(SmaConfig::new(3).unwrap());
/// let identity = MetricIdentity::new("web01", "cpu", "percent");
///
/// let mut outputs = Vec::new();
/// for reading in [10.0, 20.0, 30.0, 40.0] {
///   let mut record =
///     MetricRecord::new(identity.clone()).with_source(DataSource::gauge("value", reading));
///   transformer.apply(&mut record);
///   outputs.push(record.sources[0].value);
/// }
/// // Buffers: [10,0,0] [10,20,0] [10,20,30] [40,20,30]
/// assert_eq!(outputs[1..], [Value::Gauge(10.0), Value::Gauge(20.0), Value::Gauge(30.0)]);
/// ```
#[derive(Debug)]
pub struct SmaTransformer {
  /// Configuration for the transformer.
  pub(crate) config: TransformerConfig,
  /// Resolved window size and data source filter.
  pub(crate) settings: Arc<SmaConfig>,
  /// Window state per metric identity (wrapped in Arc for sharing).
  pub(crate) store: Arc<WindowStore>,
}

impl Clone for SmaTransformer {
  fn clone(&self) -> Self {
    Self {
      config: self.config.clone(),
      settings: Arc::clone(&self.settings),
      store: Arc::clone(&self.store),
    }
  }
}

impl SmaTransformer {
  /// Creates a new SmaTransformer from resolved settings.
  pub fn new(settings: SmaConfig) -> Self {
    Self {
      config: TransformerConfig::default(),
      settings: Arc::new(settings),
      store: Arc::new(WindowStore::new()),
    }
  }

  /// Resolves `options` and creates a transformer from them.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::InvalidArgument`] if `Window` or `DataSource` is
  /// malformed. Nothing is allocated in that case.
  pub fn from_config_item(options: &ConfigItem) -> Result<Self, ConfigError> {
    SmaConfig::resolve(options).map(Self::new)
  }

  /// Returns the window size.
  pub fn window_size(&self) -> usize {
    self.settings.window_size()
  }

  /// Returns the configured data source names (empty means all).
  pub fn data_sources(&self) -> &[String] {
    self.settings.data_sources()
  }

  /// Returns the resolved settings.
  pub fn settings(&self) -> &SmaConfig {
    &self.settings
  }

  /// Returns the window store shared by all clones of this transformer.
  pub fn windows(&self) -> &WindowStore {
    &self.store
  }

  /// Averages every selected gauge data source of `record` in place.
  ///
  /// Slots are visited in ascending order. A slot is left untouched if its name
  /// is not selected or if it is not a gauge. If the series' window cannot be
  /// allocated, or was allocated for a different number of data sources, the
  /// whole record passes through unmodified. Always returns
  /// [`TargetAction::Continue`].
  pub fn apply(&self, record: &mut MetricRecord) -> TargetAction {
    if let Err(err) = self.average_record(record) {
      match err {
        StateError::ShapeMismatch { .. } => warn!(
          identity = %record.identity,
          error = %err,
          "sma target: data source layout changed; passing record through unmodified"
        ),
        _ => error!(
          identity = %record.identity,
          error = %err,
          "sma target: window unavailable; passing record through unmodified"
        ),
      }
    }
    TargetAction::Continue
  }

  /// Releases every window. Safe to call any number of times.
  pub fn teardown(&self) {
    let released = self.store.len();
    self.store.clear();
    debug!(released, "sma target: released moving average windows");
  }

  fn average_record(&self, record: &mut MetricRecord) -> StateResult<()> {
    let eligible = self.eligible_slots(record);
    if eligible.is_empty() {
      return Ok(());
    }

    let window = self.store.ensure_allocated(
      &record.identity,
      record.sources.len(),
      self.settings.window(),
    )?;
    let mut state = window.lock()?;

    for slot in eligible {
      let source = &mut record.sources[slot];
      if let Value::Gauge(reading) = source.value {
        source.value = Value::Gauge(state.push_and_average(slot, reading)?);
      }
    }
    Ok(())
  }

  fn eligible_slots(&self, record: &MetricRecord) -> Vec<usize> {
    let mut eligible = Vec::with_capacity(record.sources.len());
    for (slot, source) in record.sources.iter().enumerate() {
      if !self.settings.matches(&source.name) {
        continue;
      }
      match source.kind() {
        DataSourceKind::Gauge => eligible.push(slot),
        kind => warn!(
          identity = %record.identity,
          data_source = %source.name,
          %kind,
          "sma target: ignoring unsupported data source type"
        ),
      }
    }
    eligible
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ConfigValue;
  use crate::record::{DataSource, MetricIdentity};

  fn gauge_record(identity: &MetricIdentity, value: f64) -> MetricRecord {
    MetricRecord::new(identity.clone()).with_source(DataSource::gauge("value", value))
  }

  fn gauge_of(record: &MetricRecord, slot: usize) -> f64 {
    record.sources[slot].value.as_gauge().unwrap()
  }

  #[test]
  fn test_sma_transformer_new() {
    let transformer = SmaTransformer::new(SmaConfig::new(5).unwrap());
    assert_eq!(transformer.window_size(), 5);
    assert!(transformer.data_sources().is_empty());
    assert!(transformer.windows().is_empty());
  }

  #[test]
  fn test_sma_transformer_from_config_item() {
    let options = ConfigItem::new("sma")
      .with_child(ConfigItem::new("Window").with_value(4.0))
      .with_child(ConfigItem::new("DataSource").with_value("rx").with_value("tx"));

    let transformer = SmaTransformer::from_config_item(&options).unwrap();
    assert_eq!(transformer.window_size(), 4);
    assert_eq!(transformer.data_sources(), ["rx", "tx"]);
  }

  #[test]
  fn test_sma_transformer_from_config_item_rejects_bad_window() {
    let options = ConfigItem::new("sma").with_child(ConfigItem {
      key: "Window".to_string(),
      values: vec![ConfigValue::String("five".to_string())],
      children: Vec::new(),
    });

    let result = SmaTransformer::from_config_item(&options);
    assert!(matches!(result, Err(ConfigError::InvalidArgument { .. })));
  }

  #[test]
  fn test_sma_zero_padded_until_full() {
    let transformer = SmaTransformer::new(SmaConfig::new(3).unwrap());
    let identity = MetricIdentity::new("host", "cpu", "percent");

    let mut outputs = Vec::new();
    for value in [10.0, 20.0, 30.0, 40.0] {
      let mut record = gauge_record(&identity, value);
      assert_eq!(transformer.apply(&mut record), TargetAction::Continue);
      outputs.push(gauge_of(&record, 0));
    }

    assert!((outputs[0] - 10.0 / 3.0).abs() < 1e-12);
    assert_eq!(outputs[1], 10.0);
    assert_eq!(outputs[2], 20.0);
    assert_eq!(outputs[3], 30.0);
  }

  #[test]
  fn test_sma_window_size_one_is_identity() {
    let transformer = SmaTransformer::new(SmaConfig::default());
    let identity = MetricIdentity::new("host", "load", "load");

    for value in [5.0, -2.5, 1e9] {
      let mut record = gauge_record(&identity, value);
      transformer.apply(&mut record);
      assert_eq!(gauge_of(&record, 0), value);
    }
  }

  #[test]
  fn test_sma_skips_counters_without_allocating() {
    let transformer = SmaTransformer::new(SmaConfig::new(2).unwrap());
    let identity = MetricIdentity::new("host", "interface", "if_packets");
    let mut record = MetricRecord::new(identity.clone())
      .with_source(DataSource::counter("rx", 100))
      .with_source(DataSource::counter("tx", 200));

    transformer.apply(&mut record);

    assert_eq!(record.sources[0].value, Value::Counter(100));
    assert_eq!(record.sources[1].value, Value::Counter(200));
    assert!(!transformer.windows().contains(&identity));
  }

  #[test]
  fn test_sma_filter_without_match_does_not_allocate() {
    let settings = SmaConfig::new(2).unwrap().with_data_source("rx");
    let transformer = SmaTransformer::new(settings);
    let identity = MetricIdentity::new("host", "memory", "memory");
    let mut record = gauge_record(&identity, 8.0);

    transformer.apply(&mut record);

    assert_eq!(gauge_of(&record, 0), 8.0);
    assert!(transformer.windows().is_empty());
  }

  #[test]
  fn test_sma_teardown_is_idempotent() {
    let transformer = SmaTransformer::new(SmaConfig::new(2).unwrap());
    let identity = MetricIdentity::new("host", "cpu", "percent");
    transformer.apply(&mut gauge_record(&identity, 1.0));
    assert_eq!(transformer.windows().len(), 1);

    transformer.teardown();
    transformer.teardown();
    assert!(transformer.windows().is_empty());

    // A fresh window starts zero-filled again.
    let mut record = gauge_record(&identity, 4.0);
    transformer.apply(&mut record);
    assert_eq!(gauge_of(&record, 0), 2.0);
  }

  #[test]
  fn test_sma_teardown_without_records() {
    let transformer = SmaTransformer::new(SmaConfig::default());
    transformer.teardown();
    assert!(transformer.windows().is_empty());
  }

  #[test]
  fn test_sma_transformer_clone_shares_windows() {
    let transformer1 = SmaTransformer::new(SmaConfig::new(2).unwrap());
    let transformer2 = transformer1.clone();
    let identity = MetricIdentity::new("host", "cpu", "percent");

    let mut first = gauge_record(&identity, 2.0);
    transformer1.apply(&mut first);
    let mut second = gauge_record(&identity, 4.0);
    transformer2.apply(&mut second);

    assert_eq!(gauge_of(&first, 0), 1.0);
    assert_eq!(gauge_of(&second, 0), 3.0);
    assert_eq!(transformer1.windows().len(), 1);
  }
}
