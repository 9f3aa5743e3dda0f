//! Keyed state for transformers that track many independent series.
//!
//! This module provides the [`StatefulTransformer`] trait, which extends the base
//! [`Transformer`](crate::transformer::Transformer) trait with access to a
//! [`KeyedStateStore`]. Each key (for example a metric identity) owns its own piece
//! of state behind its own lock, so:
//!
//! - updates for the same key are serialized,
//! - updates for different keys proceed independently,
//! - the map lock is only held long enough to look up or insert an entry.
//!
//! # Example
//!
//! ```rust
//! use sma_target::stateful_transformer::{InMemoryKeyedStateStore, KeyedStateStore, KeyedStateStoreExt};
//!
//! let store: InMemoryKeyedStateStore<String, u64> = InMemoryKeyedStateStore::new();
//! let counter = store.get_or_try_insert("requests".to_string(), || Ok(0)).unwrap();
//! *counter.lock().unwrap() += 1;
//!
//! assert_eq!(store.len(), 1);
//! assert_eq!(*store.get(&"requests".to_string()).unwrap().unwrap().lock().unwrap(), 1);
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;

use crate::transformer::Transformer;

/// Error type for state operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
  /// Lock acquisition failed (poisoned).
  #[error("state lock is poisoned")]
  LockPoisoned,
  /// Memory for new state could not be obtained.
  #[error("failed to allocate {requested} window values for `{identity}'")]
  Allocation {
    /// The series the state was being allocated for.
    identity: String,
    /// Number of values requested.
    requested: usize,
  },
  /// A record's data source count differs from the series' existing state.
  #[error("`{identity}' was allocated for {expected} data sources, record carries {actual}")]
  ShapeMismatch {
    /// The series whose state did not match.
    identity: String,
    /// Data source count fixed at first allocation.
    expected: usize,
    /// Data source count of the offending record.
    actual: usize,
  },
  /// A data source slot outside the allocated state was addressed.
  #[error("slot {slot} is out of range for {data_source_count} data sources")]
  SlotOutOfRange {
    /// The slot that was addressed.
    slot: usize,
    /// Number of slots the state holds.
    data_source_count: usize,
  },
}

impl<T> From<PoisonError<T>> for StateError {
  fn from(_: PoisonError<T>) -> Self {
    StateError::LockPoisoned
  }
}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Shared handle to the state of one key.
pub type SharedState<S> = Arc<Mutex<S>>;

/// Boxed initializer run when a key is seen for the first time.
pub type StateInit<'a, S> = Box<dyn FnOnce() -> StateResult<S> + 'a>;

/// Trait for keyed state storage backends.
///
/// The trait uses `Box<dyn FnOnce>` for initializers to stay dyn compatible;
/// [`KeyedStateStoreExt`] adds a closure-friendly wrapper.
pub trait KeyedStateStore<K, S>: Send + Sync
where
  K: Eq + Hash + Clone + Send + Sync,
  S: Send,
{
  /// Returns the state for `key`, or `None` if the key has never been seen.
  fn get(&self, key: &K) -> StateResult<Option<SharedState<S>>>;

  /// Returns the state for `key`, creating it with `init` if absent.
  ///
  /// `init` runs at most once per key. If it fails nothing is stored and the
  /// error is returned.
  fn get_or_try_insert_with(&self, key: K, init: StateInit<'_, S>) -> StateResult<SharedState<S>>;

  /// Forgets the state of one key. Returns `true` if it existed.
  fn remove(&self, key: &K) -> StateResult<bool>;

  /// Forgets every key and releases its state.
  ///
  /// Always succeeds: a poisoned map is recovered and cleared anyway.
  fn clear(&self);

  /// Number of keys with state.
  fn len(&self) -> usize;

  /// Returns `true` if no key has state.
  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// All keys currently holding state, in no particular order.
  fn keys(&self) -> StateResult<Vec<K>>;
}

/// Extension trait for creating state with plain closures.
pub trait KeyedStateStoreExt<K, S>: KeyedStateStore<K, S>
where
  K: Eq + Hash + Clone + Send + Sync,
  S: Send,
{
  /// Returns the state for `key`, creating it with `init` if absent.
  ///
  /// This is a convenience method that boxes the closure internally.
  fn get_or_try_insert<F>(&self, key: K, init: F) -> StateResult<SharedState<S>>
  where
    F: FnOnce() -> StateResult<S>,
  {
    self.get_or_try_insert_with(key, Box::new(init))
  }
}

// Blanket implementation for all KeyedStateStore types
impl<K, S, T> KeyedStateStoreExt<K, S> for T
where
  K: Eq + Hash + Clone + Send + Sync,
  S: Send,
  T: KeyedStateStore<K, S>,
{
}

/// In-memory keyed store: a `RwLock`ed map of per-key `Mutex`es.
///
/// # Thread Safety
///
/// All operations can be called concurrently from multiple threads without
/// external synchronization.
#[derive(Debug)]
pub struct InMemoryKeyedStateStore<K, S> {
  entries: RwLock<HashMap<K, SharedState<S>>>,
}

impl<K, S> InMemoryKeyedStateStore<K, S> {
  /// Creates an empty store.
  pub fn new() -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
    }
  }
}

impl<K, S> Default for InMemoryKeyedStateStore<K, S> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, S> KeyedStateStore<K, S> for InMemoryKeyedStateStore<K, S>
where
  K: Eq + Hash + Clone + Send + Sync,
  S: Send,
{
  fn get(&self, key: &K) -> StateResult<Option<SharedState<S>>> {
    let entries = self.entries.read()?;
    Ok(entries.get(key).map(Arc::clone))
  }

  fn get_or_try_insert_with(&self, key: K, init: StateInit<'_, S>) -> StateResult<SharedState<S>> {
    if let Some(existing) = self.entries.read()?.get(&key) {
      return Ok(Arc::clone(existing));
    }

    // Another writer may have inserted the key between the two locks.
    let mut entries = self.entries.write()?;
    if let Some(existing) = entries.get(&key) {
      return Ok(Arc::clone(existing));
    }
    let state = Arc::new(Mutex::new(init()?));
    entries.insert(key, Arc::clone(&state));
    Ok(state)
  }

  fn remove(&self, key: &K) -> StateResult<bool> {
    let mut entries = self.entries.write()?;
    Ok(entries.remove(key).is_some())
  }

  fn clear(&self) {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    entries.clear();
    entries.shrink_to_fit();
  }

  fn len(&self) -> usize {
    self
      .entries
      .read()
      .map(|entries| entries.len())
      .unwrap_or(0)
  }

  fn keys(&self) -> StateResult<Vec<K>> {
    let entries = self.entries.read()?;
    Ok(entries.keys().cloned().collect())
  }
}

/// Trait for transformers that keep keyed state across stream items.
///
/// # State Lifecycle
///
/// 1. **Creation**: state for a key is created lazily, the first time an item
///    for that key arrives.
/// 2. **Access**: items for the same key see the state left by earlier items.
/// 3. **Reset**: [`reset_state`](StatefulTransformer::reset_state) forgets every key.
/// 4. **Cleanup**: state is released when the last clone of the transformer is dropped.
pub trait StatefulTransformer: Transformer {
  /// Key identifying one independent piece of state.
  type Key: Eq + Hash + Clone + Send + Sync;
  /// The state kept per key.
  type State: Send;
  /// The store holding the state.
  type Store: KeyedStateStore<Self::Key, Self::State>;

  /// Returns the transformer's state store.
  fn state_store(&self) -> &Self::Store;

  /// Forgets the state of every key.
  fn reset_state(&self) {
    self.state_store().clear();
  }

  /// Returns `true` if at least one key has state.
  fn has_state(&self) -> bool {
    !self.state_store().is_empty()
  }

  /// Keys currently holding state.
  fn tracked_keys(&self) -> StateResult<Vec<Self::Key>> {
    self.state_store().keys()
  }
}
