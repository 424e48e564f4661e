//! WAL Reader
//!
//! Handles reading rows back from the WAL file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{KvError, Result};
use super::WalEntry;

/// Reads entries from the WAL file, in append order
pub struct WalReader {
    reader: BufReader<File>,
    line_no: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            line_no: 0,
        })
    }

    /// Read the next row
    ///
    /// `Ok(None)` at end of file. A malformed row is an error, but the
    /// reader stays positioned after it so the caller may keep going.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        loop {
            let mut bytes = Vec::new();
            if self.reader.read_until(b'\n', &mut bytes)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let row = String::from_utf8(bytes).map_err(|_| {
                KvError::WalCorruption(format!("row {} is not valid UTF-8", self.line_no))
            })?;

            if row.trim().is_empty() {
                continue;
            }

            return WalEntry::from_row(&row).map(Some);
        }
    }

    /// 1-based number of the last row read
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Iterate over all rows
    pub fn entries(self) -> WalIterator {
        WalIterator { reader: self }
    }
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_entry().transpose()
    }
}
