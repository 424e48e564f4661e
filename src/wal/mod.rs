//! Write-Ahead Log (WAL) Module
//!
//! Provides an ordered, batched record of every mutation.
//!
//! ## Responsibilities
//! - Accept operation lines without blocking the caller (bounded queue)
//! - Stamp, batch and append them from a background thread
//! - Replay the log into storage on startup
//!
//! ## File Format
//! ```text
//! 1718000000 SET alpha 1
//! 1718000000 SET beta 2
//! 1718000003 DEL alpha
//! ```
//! One row per entry: unix seconds, a space, the canonical operation line.

mod entry;
mod writer;
mod log;
mod reader;
mod recovery;

pub use entry::{unix_now, WalEntry};
pub use writer::{LogSink, WalWriter};
pub use log::WriteAheadLog;
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
