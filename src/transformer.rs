//! # Transformer Trait
//!
//! This module defines the `Transformer` trait for components that transform data
//! streams. A transformer sits between the host's record source and its writers
//! and rewrites records as they flow past.
//!
//! ## Overview
//!
//! The Transformer trait provides:
//!
//! - **Stream Transformation**: Async transformation of input streams into output streams
//! - **Component Information**: Name and type information for diagnostics
//! - **Configuration**: [`TransformerConfig`] for naming
//!
//! ## Example
//!
//! ```rust
//! use sma_target::config::SmaConfig;
//! use sma_target::record::{DataSource, MetricIdentity, MetricRecord};
//! use sma_target::transformer::Transformer;
//! use sma_target::transformers::sma::SmaTransformer;
//! use futures::{stream, StreamExt};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut transformer = SmaTransformer::new(SmaConfig::new(2)?);
//! let identity = MetricIdentity::new("db01", "memory", "memory");
//! let records = vec![
//!   MetricRecord::new(identity.clone()).with_source(DataSource::gauge("value", 4.0)),
//!   MetricRecord::new(identity).with_source(DataSource::gauge("value", 8.0)),
//! ];
//!
//! let mut output = transformer.transform(Box::pin(stream::iter(records))).await;
//! while let Some(record) = output.next().await {
//!     println!("averaged: {:?}", record.sources[0].value);
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::ComponentInfo;
use crate::{input::Input, output::Output};
use async_trait::async_trait;

/// Configuration shared by all transformers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformerConfig {
  /// Optional name for identifying this transformer in logs.
  pub name: Option<String>,
}

impl TransformerConfig {
  /// Sets the name for this transformer configuration.
  ///
  /// # Arguments
  ///
  /// * `name` - The name to assign to this transformer.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Returns the current name, if set.
  pub fn name(&self) -> Option<String> {
    self.name.clone()
  }
}

/// Trait for components that transform data streams.
///
/// Transformers process items as they flow through the pipeline. Items are
/// handed over by value and handed back by value; a transformer keeps no
/// reference to an item once it has been yielded.
#[async_trait]
pub trait Transformer: Input + Output {
  /// Transforms a stream of input items into a stream of output items.
  ///
  /// # Arguments
  ///
  /// * `input` - The input stream to transform
  ///
  /// # Returns
  ///
  /// A stream that yields transformed items of type `Self::Output`.
  async fn transform(&mut self, input: Self::InputStream) -> Self::OutputStream;

  /// Creates a new transformer instance with the given configuration.
  #[must_use]
  fn with_config(&self, config: TransformerConfig) -> Self
  where
    Self: Sized + Clone,
  {
    let mut this = self.clone();
    this.set_config(config);
    this
  }

  /// Sets the configuration for this transformer.
  fn set_config(&mut self, config: TransformerConfig) {
    self.set_config_impl(config);
  }

  /// Returns a reference to the transformer's configuration.
  fn config(&self) -> &TransformerConfig {
    self.get_config_impl()
  }

  /// Returns a mutable reference to the transformer's configuration.
  fn config_mut(&mut self) -> &mut TransformerConfig {
    self.get_config_mut_impl()
  }

  /// Sets the name for this transformer.
  ///
  /// # Arguments
  ///
  /// * `name` - The name to assign to this transformer.
  ///
  /// # Returns
  ///
  /// The transformer instance with the updated name.
  #[must_use]
  fn with_name(mut self, name: String) -> Self
  where
    Self: Sized,
  {
    self.config_mut().name = Some(name);
    self
  }

  /// Returns information about the component for diagnostics.
  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .config()
        .name()
        .unwrap_or_else(|| "transformer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }

  /// Stores the configuration. Implemented by each transformer.
  fn set_config_impl(&mut self, config: TransformerConfig);

  /// Returns the stored configuration. Implemented by each transformer.
  fn get_config_impl(&self) -> &TransformerConfig;

  /// Returns the stored configuration mutably. Implemented by each transformer.
  fn get_config_mut_impl(&mut self) -> &mut TransformerConfig;
}
