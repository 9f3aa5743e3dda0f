//! Transformer implementations for SmaTransformer.

use crate::config::ConfigItem;
use crate::error::ConfigError;
use crate::input::Input;
use crate::output::Output;
use crate::record::{MetricIdentity, MetricRecord};
use crate::stateful_transformer::StatefulTransformer;
use crate::target::{Target, TargetAction};
use crate::transformer::{Transformer, TransformerConfig};
use crate::transformers::sma::sma_transformer::SmaTransformer;
use crate::window::{WindowState, WindowStore};
use async_trait::async_trait;
use futures::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;

impl Input for SmaTransformer {
  type Input = MetricRecord;
  type InputStream = Pin<Box<dyn Stream<Item = MetricRecord> + Send>>;
}

impl Output for SmaTransformer {
  type Output = MetricRecord;
  type OutputStream = Pin<Box<dyn Stream<Item = MetricRecord> + Send>>;
}

#[async_trait]
impl Transformer for SmaTransformer {
  async fn transform(&mut self, input: Self::InputStream) -> Self::OutputStream {
    let this = self.clone();

    input
      .map(move |mut record| {
        this.apply(&mut record);
        record
      })
      .boxed()
  }

  fn set_config_impl(&mut self, config: TransformerConfig) {
    self.config = config;
  }

  fn get_config_impl(&self) -> &TransformerConfig {
    &self.config
  }

  fn get_config_mut_impl(&mut self) -> &mut TransformerConfig {
    &mut self.config
  }

  fn component_info(&self) -> crate::error::ComponentInfo {
    crate::error::ComponentInfo {
      name: self
        .config
        .name
        .clone()
        .unwrap_or_else(|| "sma_transformer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}

impl StatefulTransformer for SmaTransformer {
  type Key = MetricIdentity;
  type State = WindowState;
  type Store = WindowStore;

  fn state_store(&self) -> &Self::Store {
    &self.store
  }
}

impl Target for SmaTransformer {
  const NAME: &'static str = "sma";

  fn create(options: &ConfigItem) -> Result<Self, ConfigError> {
    SmaTransformer::from_config_item(options)
  }

  fn invoke(&self, record: &mut MetricRecord) -> TargetAction {
    self.apply(record)
  }

  fn destroy(&self) {
    self.teardown();
  }
}
