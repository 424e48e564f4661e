//! Write-ahead log front end
//!
//! Callers enqueue operation lines into a bounded queue; a background drain
//! thread stamps them, batches them into a chunk and appends full chunks to
//! the [`LogSink`].
//!
//! ```text
//!  write() ──▶ [bounded queue] ──▶ drain thread ──▶ chunk ──(full)──▶ sink
//!     ▲ blocks when full                │
//!     └──────── backpressure ───────────┘
//! ```
//!
//! ## Durability
//! `write` returning means "enqueued", not "on disk". An entry is durable
//! only after the chunk containing it has been flushed. `close` drains the
//! queue and force-flushes the partial chunk; cancellation does neither.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;

use crate::config::WalConfig;
use crate::database::CommandLog;
use crate::error::{KvError, Result};
use crate::shutdown::ShutdownSignal;
use super::{LogSink, WalEntry, WalWriter};

/// Handle to the WAL queue and its drain thread
pub struct WriteAheadLog {
    /// `None` once closed
    sender: Option<Sender<String>>,

    worker: Option<JoinHandle<()>>,
}

impl WriteAheadLog {
    /// Open the file-backed WAL described by `config`
    pub fn open(config: &WalConfig, shutdown: ShutdownSignal) -> Result<Self> {
        let config = config.clone().normalized();
        let writer = WalWriter::open(&config.path, config.sync_on_flush)?;

        tracing::info!(
            component = "wal",
            path = %writer.path().display(),
            batch_size = config.batch_size,
            queue_capacity = config.queue_capacity,
            "WAL opened"
        );

        Self::with_sink(writer, config.batch_size, config.queue_capacity, shutdown)
    }

    /// Start a WAL over an arbitrary sink
    pub fn with_sink<S: LogSink + 'static>(
        sink: S,
        batch_size: usize,
        queue_capacity: usize,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        let (sender, receiver) = channel::bounded(queue_capacity.max(1));
        let chunk = Chunk::new(sink, batch_size.max(1));

        let worker = thread::Builder::new()
            .name("kvdb-wal".to_string())
            .spawn(move || drain(receiver, chunk, shutdown))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Enqueue an operation line
    ///
    /// Blocks only while the queue is full.
    pub fn write(&self, operation_line: String) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(KvError::WalClosed)?;
        sender.send(operation_line).map_err(|_| KvError::WalClosed)
    }

    /// Drain the queue, flush the partial chunk and stop the thread
    pub fn close(&mut self) -> Result<()> {
        self.sender.take();

        if let Some(worker) = self.worker.take() {
            worker.join().map_err(|_| {
                KvError::Io(io::Error::new(io::ErrorKind::Other, "WAL drain thread panicked"))
            })?;
        }

        Ok(())
    }
}

impl CommandLog for WriteAheadLog {
    fn write(&self, operation_line: String) -> Result<()> {
        WriteAheadLog::write(self, operation_line)
    }

    fn close(&mut self) -> Result<()> {
        WriteAheadLog::close(self)
    }
}

impl Drop for WriteAheadLog {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::error!(component = "wal", error = %e, "WAL close failed");
        }
    }
}

// =============================================================================
// Drain thread
// =============================================================================

fn drain<S: LogSink>(receiver: Receiver<String>, mut chunk: Chunk<S>, shutdown: ShutdownSignal) {
    loop {
        select! {
            recv(receiver) -> msg => match msg {
                Ok(line) => chunk.push(line),
                Err(_) => {
                    // every sender dropped: graceful close
                    chunk.flush();
                    tracing::debug!(component = "wal", "WAL drained and closed");
                    return;
                }
            },
            recv(shutdown.receiver()) -> _ => {
                tracing::warn!(
                    component = "wal",
                    pending = chunk.len() + receiver.len(),
                    "WAL stopped by cancellation"
                );
                return;
            }
        }
    }
}

/// In-memory batch of stamped entries, owned by the drain thread
struct Chunk<S> {
    entries: Vec<WalEntry>,
    batch_size: usize,
    sink: S,
}

impl<S: LogSink> Chunk<S> {
    fn new(sink: S, batch_size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(batch_size),
            batch_size,
            sink,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Stamp and append; flush once the chunk is full
    fn push(&mut self, operation_line: String) {
        self.entries.push(WalEntry::new(operation_line));
        if self.entries.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Append the chunk to the sink and clear it, whatever the outcome
    fn flush(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        match self.sink.append(&self.entries) {
            Ok(()) => tracing::debug!(component = "wal", rows = self.entries.len(), "logs written"),
            // no retry: the chunk is lost
            Err(e) => tracing::error!(
                component = "wal",
                rows = self.entries.len(),
                error = %e,
                "WAL flush failed, dropping chunk"
            ),
        }

        self.entries.clear();
    }
}
