//! Shared test doubles
//!
//! Every double appends to one shared event log so tests can assert the
//! relative order of WAL enqueues and storage calls.

#![allow(dead_code)]

use std::sync::Arc;

use kvdb::error::{KvError, Result};
use kvdb::storage::{Engine, InMemoryEngine};
use kvdb::wal::{LogSink, WalEntry};
use kvdb::CommandLog;
use parking_lot::Mutex;

/// Ordered record of calls across doubles
pub type Events = Arc<Mutex<Vec<String>>>;

pub fn events() -> Events {
    Arc::new(Mutex::new(Vec::new()))
}

// =============================================================================
// Engine doubles
// =============================================================================

/// Real in-memory engine that also records each call
pub struct RecordingEngine {
    inner: InMemoryEngine,
    events: Events,
}

impl RecordingEngine {
    pub fn new(events: Events) -> Self {
        Self {
            inner: InMemoryEngine::new(),
            events,
        }
    }
}

impl Engine for RecordingEngine {
    fn get(&self, key: &str) -> Result<String> {
        self.events.lock().push(format!("storage:get {}", key));
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.events.lock().push(format!("storage:set {} {}", key, value));
        self.inner.set(key, value)
    }

    fn del(&self, key: &str) -> Result<()> {
        self.events.lock().push(format!("storage:del {}", key));
        self.inner.del(key)
    }
}

/// Engine whose every call fails
pub struct FailingEngine;

impl Engine for FailingEngine {
    fn get(&self, _key: &str) -> Result<String> {
        Err(KvError::Engine("disk on fire".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(KvError::Engine("disk on fire".to_string()))
    }

    fn del(&self, _key: &str) -> Result<()> {
        Err(KvError::Engine("disk on fire".to_string()))
    }
}

// =============================================================================
// WAL doubles
// =============================================================================

/// Command log that records enqueued lines
pub struct RecordingLog {
    events: Events,
}

impl RecordingLog {
    pub fn new(events: Events) -> Self {
        Self { events }
    }
}

impl CommandLog for RecordingLog {
    fn write(&self, operation_line: String) -> Result<()> {
        self.events.lock().push(format!("wal:{}", operation_line));
        Ok(())
    }
}

/// Command log whose drain thread is gone
pub struct ClosedLog;

impl CommandLog for ClosedLog {
    fn write(&self, _operation_line: String) -> Result<()> {
        Err(KvError::WalClosed)
    }
}

/// Sink that keeps every flushed chunk
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub chunks: Arc<Mutex<Vec<Vec<WalEntry>>>>,
}

impl RecordingSink {
    pub fn chunks(&self) -> Vec<Vec<WalEntry>> {
        self.chunks.lock().clone()
    }

    pub fn operation_lines(&self) -> Vec<String> {
        self.chunks
            .lock()
            .iter()
            .flatten()
            .map(|e| e.operation_line.clone())
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn append(&mut self, chunk: &[WalEntry]) -> Result<()> {
        self.chunks.lock().push(chunk.to_vec());
        Ok(())
    }
}

/// Sink that fails its first `failures` appends, then records
#[derive(Clone, Default)]
pub struct FlakySink {
    pub failures: Arc<Mutex<usize>>,
    pub recorded: RecordingSink,
}

impl FlakySink {
    pub fn failing(times: usize) -> Self {
        Self {
            failures: Arc::new(Mutex::new(times)),
            recorded: RecordingSink::default(),
        }
    }
}

impl LogSink for FlakySink {
    fn append(&mut self, chunk: &[WalEntry]) -> Result<()> {
        {
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(KvError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "no space left",
                )));
            }
        }
        self.recorded.append(chunk)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until<F: FnMut() -> bool>(timeout: std::time::Duration, mut condition: F) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    condition()
}
