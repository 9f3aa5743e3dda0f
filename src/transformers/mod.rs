//! # Transformers Module
//!
//! Transformer implementations that rewrite measurement records in flight.
//!
//! ## Overview
//!
//! - **sma**: replaces gauge values with their simple moving average per series
//!
//! ## Example Usage
//!
//! ```rust
//! use sma_target::config::SmaConfig;
//! use sma_target::transformers::sma::SmaTransformer;
//!
//! let transformer = SmaTransformer::new(SmaConfig::new(5).unwrap().with_data_source("rx"));
//! assert_eq!(transformer.window_size(), 5);
//! ```

/// Simple moving average over a per-series sample window.
pub mod sma;

pub use sma::SmaTransformer;
