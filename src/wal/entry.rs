//! WAL Entry definitions
//!
//! Defines the structure of individual WAL rows.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{KvError, Result};

/// A single entry in the WAL
///
/// Serialized as one text row: `<unix_seconds> <operation_line>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Unix seconds when the drain thread picked the entry up
    pub timestamp: u64,

    /// Canonical mutating command, e.g. `SET k v` or `DEL k`
    pub operation_line: String,
}

impl WalEntry {
    /// Stamp an operation line with the current time
    pub fn new(operation_line: impl Into<String>) -> Self {
        Self::with_timestamp(unix_now(), operation_line)
    }

    pub fn with_timestamp(timestamp: u64, operation_line: impl Into<String>) -> Self {
        Self {
            timestamp,
            operation_line: operation_line.into(),
        }
    }

    /// Render the row without its newline
    pub fn to_row(&self) -> String {
        format!("{} {}", self.timestamp, self.operation_line)
    }

    /// Parse a row produced by [`WalEntry::to_row`]
    pub fn from_row(row: &str) -> Result<Self> {
        let row = row.trim_end_matches(['\r', '\n']);
        let (timestamp, operation_line) = row
            .split_once(' ')
            .ok_or_else(|| KvError::WalCorruption(format!("missing separator: {:?}", row)))?;

        let timestamp = timestamp
            .parse::<u64>()
            .map_err(|e| KvError::WalCorruption(format!("bad timestamp {:?}: {}", timestamp, e)))?;

        if operation_line.trim().is_empty() {
            return Err(KvError::WalCorruption(format!("empty operation: {:?}", row)));
        }

        Ok(Self::with_timestamp(timestamp, operation_line))
    }
}

/// Seconds since the Unix epoch (0 if the clock is before it)
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
