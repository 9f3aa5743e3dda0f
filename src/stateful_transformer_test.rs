//! Tests for stateful transformer module.

use crate::stateful_transformer::*;
use std::sync::Arc;
use std::thread;

// ============================================================================
// InMemoryKeyedStateStore
// ============================================================================

#[test]
fn test_store_starts_empty() {
  let store: InMemoryKeyedStateStore<String, i64> = InMemoryKeyedStateStore::new();
  assert!(store.is_empty());
  assert_eq!(store.len(), 0);
  assert!(store.get(&"missing".to_string()).unwrap().is_none());
}

#[test]
fn test_get_or_try_insert_runs_init_once() {
  let store: InMemoryKeyedStateStore<&'static str, i64> = InMemoryKeyedStateStore::default();
  let mut calls = 0;

  let first = store
    .get_or_try_insert("a", || {
      calls += 1;
      Ok(10)
    })
    .unwrap();
  *first.lock().unwrap() += 5;

  let second = store
    .get_or_try_insert("a", || {
      calls += 1;
      Ok(0)
    })
    .unwrap();

  assert_eq!(calls, 1);
  assert_eq!(*second.lock().unwrap(), 15);
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_failed_init_stores_nothing() {
  let store: InMemoryKeyedStateStore<&'static str, Vec<f64>> = InMemoryKeyedStateStore::new();

  let result = store.get_or_try_insert("a", || {
    Err(StateError::Allocation {
      identity: "a".to_string(),
      requested: 8,
    })
  });

  assert!(matches!(result, Err(StateError::Allocation { requested: 8, .. })));
  assert!(store.is_empty());

  // A later attempt may succeed.
  store.get_or_try_insert("a", || Ok(vec![0.0; 8])).unwrap();
  assert_eq!(store.len(), 1);
}

#[test]
fn test_remove_and_keys() {
  let store: InMemoryKeyedStateStore<u32, u32> = InMemoryKeyedStateStore::new();
  for key in 0..3 {
    store.get_or_try_insert(key, || Ok(key * 10)).unwrap();
  }

  assert!(store.remove(&1).unwrap());
  assert!(!store.remove(&1).unwrap());

  let mut keys = store.keys().unwrap();
  keys.sort();
  assert_eq!(keys, vec![0, 2]);
}

#[test]
fn test_clear_is_idempotent() {
  let store: InMemoryKeyedStateStore<u32, u32> = InMemoryKeyedStateStore::new();
  store.get_or_try_insert(1, || Ok(1)).unwrap();

  store.clear();
  store.clear();
  assert!(store.is_empty());
}

#[test]
fn test_clear_recovers_poisoned_map() {
  let store: Arc<InMemoryKeyedStateStore<u32, u32>> = Arc::new(InMemoryKeyedStateStore::new());
  store.get_or_try_insert(1, || Ok(1)).unwrap();

  let poisoner = Arc::clone(&store);
  let _ = thread::spawn(move || {
    let _ = poisoner.get_or_try_insert(2, || panic!("init panicked"));
  })
  .join();

  assert!(matches!(store.get(&1), Err(StateError::LockPoisoned)));
  assert!(matches!(store.keys(), Err(StateError::LockPoisoned)));

  store.clear();
  store.clear();
}

#[test]
fn test_concurrent_updates_on_distinct_keys() {
  let store: Arc<InMemoryKeyedStateStore<usize, u64>> = Arc::new(InMemoryKeyedStateStore::new());

  let handles: Vec<_> = (0..8)
    .map(|key| {
      let store = Arc::clone(&store);
      thread::spawn(move || {
        for _ in 0..1000 {
          let state = store.get_or_try_insert(key % 4, || Ok(0)).unwrap();
          *state.lock().unwrap() += 1;
        }
      })
    })
    .collect();
  for handle in handles {
    handle.join().unwrap();
  }

  assert_eq!(store.len(), 4);
  for key in 0..4 {
    let state = store.get(&key).unwrap().unwrap();
    assert_eq!(*state.lock().unwrap(), 2000);
  }
}

// ============================================================================
// StateError
// ============================================================================

#[test]
fn test_state_error_display() {
  assert_eq!(StateError::LockPoisoned.to_string(), "state lock is poisoned");
  assert_eq!(
    StateError::ShapeMismatch {
      identity: "h/p/t".to_string(),
      expected: 2,
      actual: 3,
    }
    .to_string(),
    "`h/p/t' was allocated for 2 data sources, record carries 3"
  );
  assert_eq!(
    StateError::SlotOutOfRange {
      slot: 4,
      data_source_count: 2,
    }
    .to_string(),
    "slot 4 is out of range for 2 data sources"
  );
}
