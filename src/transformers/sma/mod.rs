//! Simple moving average transformer.

/// The SmaTransformer builder and per-record averaging.
pub mod sma_transformer;
/// Stream, stateful and target trait implementations for SmaTransformer.
pub mod transformer;

pub use sma_transformer::*;
