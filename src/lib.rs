//! # kvdb
//!
//! A single-node key-value database with:
//! - A three-verb line protocol (`GET`, `SET`, `DEL`)
//! - A batched, background-flushed write-ahead log with replay
//! - A thread-per-connection TCP server with admission control
//! - An interactive REPL over the same execute contract
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────┐   ┌──────────────────────────┐
//! │        TCP Server           │   │       REPL (kvdb-cli)    │
//! │ accept ─▶ queue ─▶ dispatch │   │                          │
//! └──────────────┬──────────────┘   └─────────────┬────────────┘
//!                │        Executor::execute(raw)  │
//!                └───────────────┬────────────────┘
//!                                ▼
//!                   ┌──────────────────────────┐
//!                   │   Database (orchestr.)   │
//!                   │ parse ─▶ WAL ─▶ storage  │
//!                   └─────┬──────────────┬─────┘
//!                         │              │
//!                         ▼              ▼
//!                ┌──────────────┐  ┌─────────────┐
//!                │     WAL      │  │  Storage    │
//!                │ queue+chunk  │  │ dyn Engine  │
//!                └──────────────┘  └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod shutdown;

pub mod protocol;
pub mod wal;
pub mod storage;
pub mod database;
pub mod network;
pub mod repl;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use database::{CommandLog, Database, Executor};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
