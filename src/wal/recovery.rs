//! WAL Recovery
//!
//! Rebuilds engine state on startup by replaying the WAL.

use std::path::Path;

use crate::error::{KvError, Result};
use crate::protocol::{self, Command};
use crate::storage::Storage;
use super::{WalEntry, WalReader};

/// Handles WAL replay after a restart
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully applied (or verified)
    pub entries_recovered: u64,

    /// Number of unreadable or non-mutating rows skipped
    pub entries_corrupted: u64,

    /// Timestamp of the last good entry
    pub last_timestamp: u64,
}

impl WalRecovery {
    /// Replay every mutation in the WAL into `storage`, in log order
    ///
    /// Corrupted rows (e.g. a torn final line) are skipped and counted.
    /// A missing file recovers nothing. Replay never writes to the WAL.
    pub fn replay(path: &Path, storage: &Storage) -> Result<RecoveryResult> {
        let result = Self::scan(path, |command| match command {
            Command::Set { key, value } => storage.set(&key, &value),
            Command::Del { key } => storage.del(&key),
            // filtered out by decode
            Command::Get { .. } => Ok(()),
        })?;

        tracing::info!(
            component = "wal",
            path = %path.display(),
            recovered = result.entries_recovered,
            corrupted = result.entries_corrupted,
            "WAL replay finished"
        );

        Ok(result)
    }

    /// Count good and bad rows without applying anything
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path, |_| Ok(()))
    }

    fn scan<F>(path: &Path, mut apply: F) -> Result<RecoveryResult>
    where
        F: FnMut(Command) -> Result<()>,
    {
        let mut result = RecoveryResult::default();
        if !path.exists() {
            return Ok(result);
        }

        let mut reader = WalReader::open(path)?;
        loop {
            let entry = match reader.next_entry() {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(KvError::WalCorruption(reason)) => {
                    tracing::warn!(component = "wal", line = reader.line_no(), %reason, "skipping WAL row");
                    result.entries_corrupted += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match Self::decode(&entry) {
                Some(command) => {
                    apply(command)?;
                    result.entries_recovered += 1;
                    result.last_timestamp = entry.timestamp;
                }
                None => {
                    tracing::warn!(
                        component = "wal",
                        line = reader.line_no(),
                        operation = %entry.operation_line,
                        "skipping non-mutating WAL row"
                    );
                    result.entries_corrupted += 1;
                }
            }
        }

        Ok(result)
    }

    /// Parse an operation line back into a mutation
    fn decode(entry: &WalEntry) -> Option<Command> {
        protocol::parse(&entry.operation_line)
            .ok()
            .filter(Command::is_mutating)
    }
}
