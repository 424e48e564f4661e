//! WAL Writer
//!
//! Handles appending chunks of entries to the WAL file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use super::WalEntry;

/// Persistence target for flushed chunks
///
/// Owned by the WAL drain thread; never shared.
pub trait LogSink: Send {
    /// Append every row of the chunk, in order, as one write
    fn append(&mut self, chunk: &[WalEntry]) -> Result<()>;
}

/// Appends chunks to a file opened in append mode
pub struct WalWriter {
    path: PathBuf,
    file: File,
    sync_on_flush: bool,
}

impl WalWriter {
    /// Open or create a WAL file (and its parent directory)
    pub fn open(path: &Path, sync_on_flush: bool) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            sync_on_flush,
        })
    }

    /// Newline-joined rows, each newline-terminated
    pub fn build_message(chunk: &[WalEntry]) -> String {
        let mut message = String::new();
        for entry in chunk {
            message.push_str(&entry.to_row());
            message.push('\n');
        }
        message
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for WalWriter {
    fn append(&mut self, chunk: &[WalEntry]) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }

        self.file.write_all(Self::build_message(chunk).as_bytes())?;

        if self.sync_on_flush {
            self.sync()?;
        }

        Ok(())
    }
}
