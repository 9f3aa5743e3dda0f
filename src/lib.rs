//! # sma-target
//!
//! Per-series simple moving average for monitoring pipelines.
//!
//! Records flowing through a host pipeline carry one or more named data sources
//! ("value", "rx", "tx", ...). The [`SmaTransformer`](transformers::sma::SmaTransformer)
//! replaces each selected gauge value with the mean of the last `Window` values
//! observed for the same metric identity and data source.
//!
//! ## Key Features
//!
//! - **Per-series state**: one window per metric identity, allocated on first use
//!   and sized by the record's data source count
//! - **Name filter**: average only the listed data sources, matched case-insensitively
//! - **Gauge only**: counters and other cumulative kinds pass through untouched
//! - **Concurrent**: series are locked individually, so one transformer can be
//!   shared across tasks
//!
//! ## Quick Start
//!
//! ```rust
//! use sma_target::config::{ConfigItem, SmaConfig};
//! use sma_target::record::{DataSource, MetricIdentity, MetricRecord};
//! use sma_target::transformers::sma::SmaTransformer;
//!
//! let options = ConfigItem::new("sma")
//!   .with_child(ConfigItem::new("Window").with_value(2.0))
//!   .with_child(ConfigItem::new("DataSource").with_value("rx"));
//! let transformer = SmaTransformer::new(SmaConfig::resolve(&options).unwrap());
//!
//! let mut record = MetricRecord::new(MetricIdentity::new("web01", "interface", "if_octets"))
//!   .with_source(DataSource::gauge("RX", 10.0))
//!   .with_source(DataSource::gauge("tx", 10.0));
//! transformer.apply(&mut record);
//!
//! assert_eq!(record.sources[0].value.as_gauge(), Some(5.0));
//! assert_eq!(record.sources[1].value.as_gauge(), Some(10.0));
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Options tree and resolved transform settings.
pub mod config;
/// Configuration errors and component identification.
pub mod error;
/// Input trait for stream consumers.
pub mod input;
/// Output trait for stream producers.
pub mod output;
/// Measurement records flowing through the pipeline.
pub mod record;
/// Keyed state store and the stateful transformer trait.
pub mod stateful_transformer;
/// Host-facing target contract and continuation signal.
pub mod target;
/// Core transformer trait and configuration.
pub mod transformer;
/// Built-in transformers.
pub mod transformers;
/// Per-series circular sample windows.
pub mod window;

#[cfg(test)]
mod record_test;
#[cfg(test)]
mod stateful_transformer_test;
#[cfg(test)]
mod target_test;
