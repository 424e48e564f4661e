//! Tests for the storage facade
//!
//! The facade must forward each call to its engine exactly once and pass
//! engine errors through untouched.

use std::sync::Arc;

use kvdb::storage::{InMemoryEngine, Storage};
use kvdb::KvError;

use crate::common::{events, FailingEngine, RecordingEngine};

#[test]
fn test_forwards_each_call_once() {
    let log = events();
    let storage = Storage::new(Arc::new(RecordingEngine::new(log.clone())));

    storage.set("a", "1").unwrap();
    assert_eq!(storage.get("a").unwrap(), "1");
    storage.del("a").unwrap();

    assert_eq!(*log.lock(), vec!["storage:set a 1", "storage:get a", "storage:del a"]);
}

#[test]
fn test_engine_errors_pass_through() {
    let storage = Storage::new(Arc::new(FailingEngine));

    assert!(matches!(storage.get("a"), Err(KvError::Engine(_))));
    assert!(matches!(storage.set("a", "1"), Err(KvError::Engine(_))));
    assert!(matches!(storage.del("a"), Err(KvError::Engine(_))));
}

#[test]
fn test_not_found_passes_through() {
    let storage = Storage::new(Arc::new(InMemoryEngine::new()));
    assert!(matches!(storage.get("a"), Err(KvError::KeyNotFound(_))));
}

#[test]
fn test_clones_share_engine() {
    let storage = Storage::new(Arc::new(InMemoryEngine::new()));
    let other = storage.clone();

    storage.set("k", "v").unwrap();

    assert_eq!(other.get("k").unwrap(), "v");
}
