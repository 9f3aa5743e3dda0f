//! Output trait for components that produce output streams.
//!
//! The counterpart of [`Input`](crate::input::Input): it names the item type a
//! component emits and the stream type it emits them on.

use futures::Stream;

/// Trait for components that produce a stream of items.
pub trait Output
where
  Self::Output: Send + 'static,
{
  /// The type of items produced.
  type Output;
  /// The output stream type that yields items of type `Self::Output`.
  type OutputStream: Stream<Item = Self::Output> + Send + 'static;
}
