//! Storage facade
//!
//! Thin pass-through to the configured [`Engine`]. Adds logging and
//! nothing else.

use std::sync::Arc;

use crate::error::{KvError, Result};
use super::Engine;

/// Delegates get/set/del to an engine
#[derive(Clone)]
pub struct Storage {
    engine: Arc<dyn Engine>,
}

impl Storage {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Fetch a value
    pub fn get(&self, key: &str) -> Result<String> {
        self.engine.get(key).map_err(|e| {
            match &e {
                KvError::KeyNotFound(_) => {
                    tracing::debug!(component = "storage", key, "key not found")
                }
                _ => tracing::error!(component = "storage", key, error = %e, "engine get failed"),
            }
            e
        })
    }

    /// Upsert a value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.engine.set(key, value).map_err(|e| {
            tracing::error!(component = "storage", key, error = %e, "engine set failed");
            e
        })
    }

    /// Remove a key
    pub fn del(&self, key: &str) -> Result<()> {
        self.engine.del(key).map_err(|e| {
            tracing::error!(component = "storage", key, error = %e, "engine del failed");
            e
        })
    }
}
