//! # Moving average pipeline
//!
//! Resolves the transform from a JSON options tree, then streams a handful of
//! interface and counter records through it and prints what comes out.
//!
//! Logs at debug level so window allocation and the "unsupported data source
//! type" diagnostic for the counter record are visible.
//!
//! Run with `cargo run --example sma_pipeline`.

use futures::{StreamExt, stream};
use sma_target::config::ConfigItem;
use sma_target::record::{DataSource, MetricIdentity, MetricRecord};
use sma_target::target::Target;
use sma_target::transformer::Transformer;
use sma_target::transformers::sma::SmaTransformer;

const OPTIONS: &str = r#"{
  "key": "Target",
  "values": ["sma"],
  "children": [
    {"key": "Window", "values": [3]},
    {"key": "DataSource", "values": ["rx", "tx", "packets"]},
    {"key": "Comment", "values": ["ignored by the target"]}
  ]
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .init();

  let options = ConfigItem::from_json(OPTIONS)?;
  let mut transformer =
    SmaTransformer::create(&options)?.with_name("interface_smoothing".to_string());

  let eth0 = MetricIdentity::new("web01", "interface", "if_octets").with_plugin_instance("eth0");
  let packets = MetricIdentity::new("web01", "interface", "if_packets").with_plugin_instance("eth0");

  let mut records = Vec::new();
  for (rx, tx) in [(1200.0, 300.0), (1800.0, 450.0), (600.0, 150.0), (2400.0, 600.0)] {
    records.push(
      MetricRecord::new(eth0.clone())
        .with_source(DataSource::gauge("rx", rx))
        .with_source(DataSource::gauge("tx", tx)),
    );
  }
  records.push(MetricRecord::new(packets).with_source(DataSource::counter("packets", 42)));

  let mut output = transformer.transform(Box::pin(stream::iter(records))).await;
  while let Some(record) = output.next().await {
    let values: Vec<String> = record
      .sources
      .iter()
      .map(|source| format!("{}={:?}", source.name, source.value))
      .collect();
    println!("{} {}", record.identity, values.join(" "));
  }

  println!("{}", transformer.component_info());
  transformer.destroy();
  Ok(())
}
