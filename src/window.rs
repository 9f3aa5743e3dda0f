//! Sample windows backing the moving average.
//!
//! This module holds the per-series sample history averaged by the
//! [`SmaTransformer`](crate::transformers::sma::SmaTransformer).
//!
//! # Overview
//!
//! Every metric identity gets one [`WindowState`], allocated the first time a
//! record for that identity is averaged. A window state holds one circular buffer
//! of `window_size` samples per data source slot, plus a write cursor per slot.
//!
//! - Buffers start zero-filled, so the average is biased toward zero until a slot
//!   has seen `window_size` samples.
//! - The cursor always points at the oldest sample, which is the next one to be
//!   overwritten.
//! - The slot count is fixed at allocation and must match every later record of
//!   the same identity.
//! - A series holds at most [`MAX_WINDOW_VALUES`] samples across all its slots.
//!   Larger shapes are refused like any other allocation failure.
//!
//! [`WindowStore`] keys window states by [`MetricIdentity`] on top of an
//! [`InMemoryKeyedStateStore`], so records of different series never contend for
//! the same lock.
//!
//! # Example
//!
//! ```rust
//! use sma_target::record::MetricIdentity;
//! use sma_target::window::WindowStore;
//! use std::num::NonZeroUsize;
//!
//! let store = WindowStore::new();
//! let identity = MetricIdentity::new("web01", "load", "load");
//! let window = store
//!   .ensure_allocated(&identity, 1, NonZeroUsize::new(3).unwrap())
//!   .unwrap();
//!
//! assert_eq!(store.push_and_average(&window, 0, 9.0).unwrap(), 3.0);
//! assert_eq!(store.push_and_average(&window, 0, 3.0).unwrap(), 4.0);
//! ```

use crate::record::MetricIdentity;
use crate::stateful_transformer::{
  InMemoryKeyedStateStore, KeyedStateStore, KeyedStateStoreExt, SharedState, StateError,
  StateInit, StateResult,
};
use std::num::NonZeroUsize;
use tracing::debug;

/// Most samples a single series may hold across all of its slots.
pub const MAX_WINDOW_VALUES: usize = 1 << 24;

/// Circular sample buffers for every data source slot of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
  window_size: usize,
  data_source_count: usize,
  // Slot `i` occupies `buffers[i * window_size..(i + 1) * window_size]`.
  buffers: Vec<f64>,
  cursors: Vec<usize>,
}

impl WindowState {
  /// Allocates zeroed buffers and cursors for `data_source_count` slots.
  ///
  /// Returns `None` if the memory cannot be obtained or the shape needs more
  /// than [`MAX_WINDOW_VALUES`] samples.
  pub fn try_new(data_source_count: usize, window_size: NonZeroUsize) -> Option<Self> {
    let window_size = window_size.get();
    let len = data_source_count
      .checked_mul(window_size)
      .filter(|len| *len <= MAX_WINDOW_VALUES)?;

    let mut buffers = Vec::new();
    buffers.try_reserve_exact(len).ok()?;
    buffers.resize(len, 0.0);

    let mut cursors = Vec::new();
    cursors.try_reserve_exact(data_source_count).ok()?;
    cursors.resize(data_source_count, 0);

    Some(Self {
      window_size,
      data_source_count,
      buffers,
      cursors,
    })
  }

  /// Number of samples per slot.
  pub fn window_size(&self) -> usize {
    self.window_size
  }

  /// Number of data source slots, fixed at allocation.
  pub fn data_source_count(&self) -> usize {
    self.data_source_count
  }

  /// The raw circular buffer of `slot`, in storage order (not age order).
  pub fn buffer(&self, slot: usize) -> Option<&[f64]> {
    if slot >= self.data_source_count {
      return None;
    }
    let offset = slot * self.window_size;
    Some(&self.buffers[offset..offset + self.window_size])
  }

  /// Index of the next sample of `slot` to be overwritten.
  pub fn cursor(&self, slot: usize) -> Option<usize> {
    self.cursors.get(slot).copied()
  }

  /// Stores `value` over the oldest sample of `slot` and returns the new mean.
  ///
  /// The mean is taken over all `window_size` entries, including zero padding
  /// that has not been overwritten yet.
  pub fn push_and_average(&mut self, slot: usize, value: f64) -> StateResult<f64> {
    if slot >= self.data_source_count {
      return Err(StateError::SlotOutOfRange {
        slot,
        data_source_count: self.data_source_count,
      });
    }

    let offset = slot * self.window_size;
    let cursor = self.cursors[slot];
    self.buffers[offset + cursor] = value;
    self.cursors[slot] = (cursor + 1) % self.window_size;

    let sum: f64 = self.buffers[offset..offset + self.window_size].iter().sum();
    Ok(sum / self.window_size as f64)
  }
}

/// Shared, individually locked window of one series.
pub type SharedWindow = SharedState<WindowState>;

/// Window states of every series a transformer has seen.
#[derive(Debug, Default)]
pub struct WindowStore {
  states: InMemoryKeyedStateStore<MetricIdentity, WindowState>,
}

impl WindowStore {
  /// Creates an empty store.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the window of `identity`, allocating it on first use.
  ///
  /// An existing window is returned unchanged. If it was allocated for a different
  /// number of data sources, [`StateError::ShapeMismatch`] is returned and the
  /// window is left untouched.
  pub fn ensure_allocated(
    &self,
    identity: &MetricIdentity,
    data_source_count: usize,
    window_size: NonZeroUsize,
  ) -> StateResult<SharedWindow> {
    let window = self.states.get_or_try_insert(identity.clone(), || {
      debug!(
        identity = %identity,
        data_source_count,
        window_size = window_size.get(),
        "allocating moving average window"
      );
      WindowState::try_new(data_source_count, window_size).ok_or_else(|| {
        StateError::Allocation {
          identity: identity.to_string(),
          requested: data_source_count.saturating_mul(window_size.get()),
        }
      })
    })?;

    let expected = window.lock()?.data_source_count();
    if expected != data_source_count {
      return Err(StateError::ShapeMismatch {
        identity: identity.to_string(),
        expected,
        actual: data_source_count,
      });
    }
    Ok(window)
  }

  /// Pushes one sample into `slot` of `window` and returns the updated mean.
  pub fn push_and_average(&self, window: &SharedWindow, slot: usize, value: f64) -> StateResult<f64> {
    let mut state = window.lock()?;
    state.push_and_average(slot, value)
  }

  /// Returns a copy of the current window of `identity`, if any.
  pub fn snapshot(&self, identity: &MetricIdentity) -> StateResult<Option<WindowState>> {
    let Some(window) = self.states.get(identity)? else {
      return Ok(None);
    };
    let state = window.lock()?.clone();
    Ok(Some(state))
  }

  /// Returns `true` if a window exists for `identity`.
  pub fn contains(&self, identity: &MetricIdentity) -> bool {
    matches!(self.states.get(identity), Ok(Some(_)))
  }

  /// Identities with an allocated window.
  pub fn identities(&self) -> StateResult<Vec<MetricIdentity>> {
    self.states.keys()
  }
}

impl KeyedStateStore<MetricIdentity, WindowState> for WindowStore {
  fn get(&self, key: &MetricIdentity) -> StateResult<Option<SharedWindow>> {
    self.states.get(key)
  }

  fn get_or_try_insert_with(
    &self,
    key: MetricIdentity,
    init: StateInit<'_, WindowState>,
  ) -> StateResult<SharedWindow> {
    self.states.get_or_try_insert_with(key, init)
  }

  fn remove(&self, key: &MetricIdentity) -> StateResult<bool> {
    self.states.remove(key)
  }

  fn clear(&self) {
    self.states.clear()
  }

  fn len(&self) -> usize {
    self.states.len()
  }

  fn keys(&self) -> StateResult<Vec<MetricIdentity>> {
    self.states.keys()
  }
}
