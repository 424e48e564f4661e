//! Engine capability
//!
//! The minimal contract any key-value backend must satisfy to sit behind
//! the [`Storage`](super::Storage) facade.

use crate::error::Result;

/// Pluggable key-value backend
///
/// ## Concurrency contract
/// The facade does not fence concurrent mutations. Implementations must
/// make each `set`/`del` atomic per key; two racing writers to the same key
/// may land in either order, but never interleave.
pub trait Engine: Send + Sync {
    /// Fetch a value. An absent key is `KvError::KeyNotFound`.
    fn get(&self, key: &str) -> Result<String>;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key succeeds.
    fn del(&self, key: &str) -> Result<()>;
}
