//! Tests for target module.

use crate::target::*;

#[test]
fn test_only_continue_keeps_processing() {
  assert!(TargetAction::Continue.is_continue());
  assert!(!TargetAction::Stop.is_continue());
  assert!(!TargetAction::Return.is_continue());
}
