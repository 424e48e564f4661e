//! Database Module
//!
//! The orchestrator that sequences every command through
//! parse → WAL → storage.
//!
//! ## Responsibilities
//! - Reject malformed input before it touches the WAL or storage
//! - Enqueue exactly one WAL entry per mutation, before applying it
//! - Dispatch exactly one storage call per valid command
//! - Replay the WAL on startup

use std::sync::Arc;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::protocol::{self, Command, QueryResult};
use crate::shutdown::ShutdownSignal;
use crate::storage::{InMemoryEngine, Storage};
use crate::wal::{WalRecovery, WriteAheadLog};

/// Narrow parse + log + apply capability handed to transports
///
/// The TCP server and the REPL only ever see this trait.
pub trait Executor: Send + Sync {
    fn execute(&self, raw: &str) -> Result<QueryResult>;
}

/// Where the orchestrator records mutations before applying them
pub trait CommandLog: Send + Sync {
    /// Enqueue one canonical operation line
    fn write(&self, operation_line: String) -> Result<()>;

    /// Flush what is pending and stop accepting writes
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The command orchestrator
///
/// ## Ordering
/// WAL entries from one `Database` are enqueued in the order their
/// `execute` calls reach the WAL. Concurrent callers interleave freely;
/// per-key ordering of the storage mutations is the engine's contract.
///
/// ## Durability
/// A mutation is acknowledged once its WAL entry is enqueued and the
/// engine applied it. The entry reaches disk with its chunk, later.
pub struct Database {
    storage: Storage,
    wal: Box<dyn CommandLog>,
}

impl Database {
    /// Assemble a database from its parts
    pub fn new(storage: Storage, wal: Box<dyn CommandLog>) -> Self {
        Self { storage, wal }
    }

    /// Open a database from configuration
    ///
    /// On startup:
    /// 1. Build the configured engine
    /// 2. Replay the WAL into it (if enabled)
    /// 3. Start the WAL drain thread
    ///
    /// A fired `shutdown` stops the drain thread without flushing. Pass
    /// [`ShutdownSignal::never`] when [`Database::close`] should be the
    /// only way the WAL stops.
    pub fn open(config: &Config, shutdown: ShutdownSignal) -> Result<Self> {
        config.validate()?;

        // Step 1: the only engine kind validate() lets through
        let storage = Storage::new(Arc::new(InMemoryEngine::new()));

        // Step 2: replay before the writer reopens the file for append
        if config.wal.replay_on_startup {
            WalRecovery::replay(&config.wal.path, &storage)?;
        }

        // Step 3: start logging
        let wal = WriteAheadLog::open(&config.wal, shutdown)?;

        Ok(Self::new(storage, Box::new(wal)))
    }

    /// Parse, log and apply one raw command line
    pub fn execute(&self, raw: &str) -> Result<QueryResult> {
        let command = protocol::parse(raw).map_err(|e| {
            tracing::debug!(component = "database", raw, error = %e, "rejected command");
            e
        })?;

        self.write_ahead(&command)?;
        self.apply(command)
    }

    /// Enqueue the WAL entry for a mutation; reads are not logged
    fn write_ahead(&self, command: &Command) -> Result<()> {
        let Some(line) = command.to_log_line() else {
            return Ok(());
        };

        self.wal.write(line).map_err(|e| {
            tracing::error!(component = "database", %command, error = %e, "WAL write failed");
            e
        })
    }

    /// Dispatch to storage
    fn apply(&self, command: Command) -> Result<QueryResult> {
        let outcome = match &command {
            Command::Get { key } => self.storage.get(key).map(QueryResult::new),
            Command::Set { key, value } => self.storage.set(key, value).map(|_| QueryResult::empty()),
            Command::Del { key } => self.storage.del(key).map(|_| QueryResult::empty()),
        };

        if let Err(e) = &outcome {
            if !matches!(e, KvError::KeyNotFound(_)) {
                tracing::error!(component = "database", %command, error = %e, "storage call failed");
            }
        }

        outcome
    }

    /// Close the WAL gracefully, flushing any partial chunk
    pub fn close(mut self) -> Result<()> {
        self.wal.close()
    }

    /// The storage facade (for replay and tests)
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl Executor for Database {
    fn execute(&self, raw: &str) -> Result<QueryResult> {
        Database::execute(self, raw)
    }
}
