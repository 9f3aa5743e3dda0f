//! Tests for record module.

use crate::record::*;

#[test]
fn test_identity_display() {
  let identity = MetricIdentity::new("web01", "interface", "if_octets");
  assert_eq!(identity.to_string(), "web01/interface/if_octets");

  let identity = identity
    .with_plugin_instance("eth0")
    .with_type_instance("total");
  assert_eq!(identity.to_string(), "web01/interface-eth0/if_octets-total");
}

#[test]
fn test_identity_equality_covers_every_field() {
  let base = MetricIdentity::new("web01", "interface", "if_octets");
  assert_eq!(base, base.clone());
  assert_ne!(base, base.clone().with_plugin_instance("eth0"));
  assert_ne!(base, base.clone().with_type_instance("eth0"));
  assert_ne!(base, MetricIdentity::new("web02", "interface", "if_octets"));
}

#[test]
fn test_value_kind() {
  assert_eq!(Value::Gauge(1.5).kind(), DataSourceKind::Gauge);
  assert_eq!(Value::Counter(1).kind(), DataSourceKind::Counter);
  assert_eq!(Value::Derive(-1).kind(), DataSourceKind::Derive);
  assert_eq!(Value::Absolute(1).kind(), DataSourceKind::Absolute);
}

#[test]
fn test_value_as_gauge() {
  assert_eq!(Value::Gauge(2.5).as_gauge(), Some(2.5));
  assert_eq!(Value::Counter(2).as_gauge(), None);
}

#[test]
fn test_kind_display() {
  assert_eq!(DataSourceKind::Gauge.to_string(), "gauge");
  assert_eq!(DataSourceKind::Absolute.to_string(), "absolute");
}

#[test]
fn test_record_builder_and_lookup() {
  let record = MetricRecord::new(MetricIdentity::new("h", "p", "t"))
    .with_source(DataSource::gauge("rx", 1.0))
    .with_source(DataSource::counter("tx", 2));

  assert_eq!(record.len(), 2);
  assert!(!record.is_empty());
  assert_eq!(record.value("rx"), Some(Value::Gauge(1.0)));
  assert_eq!(record.value("tx"), Some(Value::Counter(2)));
  assert_eq!(record.value("RX"), None);
  assert_eq!(record.sources[1].kind(), DataSourceKind::Counter);
}

#[test]
fn test_record_json_shape() {
  let json = r#"{
    "identity": {"host": "web01", "plugin": "load", "type": "load"},
    "sources": [
      {"name": "shortterm", "value": {"gauge": 0.5}},
      {"name": "forks", "value": {"derive": -4}}
    ]
  }"#;

  let record: MetricRecord = serde_json::from_str(json).unwrap();
  assert_eq!(record.identity, MetricIdentity::new("web01", "load", "load"));
  assert_eq!(record.sources[0], DataSource::gauge("shortterm", 0.5));
  assert_eq!(record.sources[1].value, Value::Derive(-4));
}
