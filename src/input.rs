//! Input trait for components that consume input streams.
//!
//! # Overview
//!
//! The [`Input`] trait defines the stream a component reads from. Transformers
//! implement it together with [`Output`](crate::output::Output) so that a
//! pipeline can check at compile time that one component's output type is the
//! next component's input type.
//!
//! # Quick Start
//!
//! ```rust
//! use sma_target::input::Input;
//! use sma_target::record::MetricRecord;
//! use futures::Stream;
//! use std::pin::Pin;
//!
//! struct MyTransformer;
//!
//! impl Input for MyTransformer {
//!     type Input = MetricRecord;
//!     type InputStream = Pin<Box<dyn Stream<Item = MetricRecord> + Send>>;
//! }
//! ```

use futures::Stream;

/// Trait for components that consume a stream of items.
pub trait Input
where
  Self::Input: Send + 'static,
{
  /// The type of items consumed.
  type Input;
  /// The input stream type that yields items of type `Self::Input`.
  type InputStream: Stream<Item = Self::Input> + Send + 'static;
}
