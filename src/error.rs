//! Error types for kvdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for kvdb operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Validation Errors (never reach the WAL or storage)
    // -------------------------------------------------------------------------
    #[error("not enough arguments for {command}")]
    NotEnoughArguments { command: &'static str },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("engine error: {0}")]
    Engine(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL is closed")]
    WalClosed,

    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("max connection limit reached")]
    Capacity,

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// True for errors produced by the parser.
    ///
    /// Their message is descriptive and safe to show the client verbatim.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KvError::NotEnoughArguments { .. } | KvError::UnknownCommand(_)
        )
    }
}
