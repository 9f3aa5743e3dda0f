//! Host-facing contract for record targets.
//!
//! A host filter chain invokes targets one record at a time and decides what to do
//! next from the [`TargetAction`] each target returns. The [`Target`] trait is the
//! seam a host registers implementations through: build from options, invoke per
//! record, tear down once.

use crate::config::ConfigItem;
use crate::error::ConfigError;
use crate::record::MetricRecord;

/// What the host should do with a record after a target has run.
///
/// The moving average target only returns `Continue`; `Stop` and `Return` exist
/// for other targets sharing the host chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
  /// Keep processing the (possibly modified) record with the next target.
  Continue,
  /// Stop processing this record; it is not dispatched further.
  Stop,
  /// Leave the current chain and resume in the calling chain.
  Return,
}

impl TargetAction {
  /// Returns `true` for [`TargetAction::Continue`].
  pub fn is_continue(&self) -> bool {
    matches!(self, TargetAction::Continue)
  }
}

/// A record target that can be registered with a host filter chain.
pub trait Target: Send + Sync {
  /// Name the target is registered under.
  const NAME: &'static str;

  /// Builds the target from its options block.
  ///
  /// A target whose options fail to resolve is never built, and the host must
  /// not register it.
  fn create(options: &ConfigItem) -> Result<Self, ConfigError>
  where
    Self: Sized;

  /// Processes one record in place.
  fn invoke(&self, record: &mut MetricRecord) -> TargetAction;

  /// Releases every resource the target holds.
  ///
  /// Must be idempotent: calling it again, or on a target that never processed
  /// a record, is a no-op.
  fn destroy(&self);
}
