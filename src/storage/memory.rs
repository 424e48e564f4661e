//! In-memory engine
//!
//! HashMap-based engine with RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{KvError, Result};
use super::Engine;

/// Volatile engine; durability comes from WAL replay
///
/// ## Concurrency:
/// - `data`: one RwLock, many concurrent readers, exclusive writer
/// - Every mutation holds the write lock for its whole duration, which
///   serializes writers per key (and globally)
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    data: RwLock<HashMap<String, String>>,
}

impl InMemoryEngine {
    /// Create a new empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Drop every key
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

impl Engine for InMemoryEngine {
    fn get(&self, key: &str) -> Result<String> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| KvError::KeyNotFound(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn del(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}
