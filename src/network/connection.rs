//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::mem;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ServerConfig;
use crate::database::Executor;
use crate::error::{KvError, Result};
use crate::protocol::{decode_line, write_response, Response, DELIMITER};
use crate::shutdown::ShutdownSignal;

/// How often a blocked read wakes up to check for shutdown
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Narrow handle to the database
    executor: Arc<dyn Executor>,

    /// Server-wide cancellation
    shutdown: ShutdownSignal,

    /// Longest accepted request line, terminator excluded
    max_message_size: usize,

    /// Close after this much silence (`None` = never)
    idle_timeout: Option<Duration>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn new(
        stream: TcpStream,
        executor: Arc<dyn Executor>,
        config: &ServerConfig,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Short read timeout so the loop can observe shutdown and idleness
        stream.set_read_timeout(Some(READ_POLL_INTERVAL))?;
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            executor,
            shutdown,
            max_message_size: config.max_message_size,
            idle_timeout: (config.idle_timeout_ms > 0)
                .then(|| Duration::from_millis(config.idle_timeout_ms)),
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads newline-terminated commands in a loop and sends one response
    /// line per command. Returns when the client disconnects, goes idle,
    /// sends an oversized line, or the server shuts down.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!(component = "connection", peer = %self.peer_addr, "connection established");

        // Room for the longest allowed line plus "\r\n"
        let line_limit = self.max_message_size + 2;
        let mut line = Vec::new();
        let mut last_activity = Instant::now();

        loop {
            if self.shutdown.is_triggered() {
                tracing::debug!(component = "connection", peer = %self.peer_addr, "closing on shutdown");
                return Ok(());
            }

            let budget = (line_limit - line.len()) as u64;
            let read = self.reader.by_ref().take(budget).read_until(DELIMITER, &mut line);

            match read {
                Ok(0) => {
                    // EOF; answer a final unterminated line if there is one
                    if !line.is_empty() {
                        self.respond(mem::take(&mut line))?;
                    }
                    tracing::debug!(component = "connection", peer = %self.peer_addr, "client disconnected");
                    return Ok(());
                }
                Ok(_) if line.last() == Some(&DELIMITER) => {
                    last_activity = Instant::now();
                    let terminator = if line.ends_with(b"\r\n") { 2 } else { 1 };
                    if line.len() - terminator > self.max_message_size {
                        return self.reject_oversized();
                    }
                    if !self.respond(mem::take(&mut line))? {
                        return Ok(());
                    }
                }
                Ok(_) => {
                    // No terminator: either the budget ran out or EOF is next
                    if line.len() >= line_limit {
                        return self.reject_oversized();
                    }
                }
                Err(ref e) if is_timeout(e) => {
                    if let Some(idle) = self.idle_timeout {
                        if last_activity.elapsed() >= idle {
                            tracing::debug!(component = "connection", peer = %self.peer_addr, "closing idle connection");
                            return Ok(());
                        }
                    }
                }
                Err(ref e) if is_disconnect(e) => {
                    tracing::debug!(component = "connection", peer = %self.peer_addr, error = %e, "connection dropped by client");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Execute one request line and write its response
    ///
    /// Returns false when the client went away before the response could
    /// be written.
    fn respond(&mut self, bytes: Vec<u8>) -> Result<bool> {
        let response = match decode_line(bytes) {
            Ok(raw) => {
                let raw = raw.trim();
                tracing::debug!(component = "connection", peer = %self.peer_addr, command = raw, "got message");
                let response = Response::from_outcome(raw, self.executor.execute(raw));
                if let Response::Failed(_) = response {
                    tracing::warn!(component = "connection", peer = %self.peer_addr, command = raw, "execute error");
                }
                response
            }
            Err(e) => Response::Invalid(e.to_string()),
        };

        self.send_response(&response)
    }

    /// Tell the client its line is too long, then close
    fn reject_oversized(&mut self) -> Result<()> {
        tracing::warn!(
            component = "connection",
            peer = %self.peer_addr,
            limit = self.max_message_size,
            "request line too large, closing"
        );
        self.send_response(&Response::TooLarge)?;
        Ok(())
    }

    /// Send a response; `Ok(false)` if the peer is already gone
    fn send_response(&mut self, response: &Response) -> Result<bool> {
        match write_response(&mut self.writer, response) {
            Ok(()) => Ok(true),
            // If the client disconnected before we could send the response
            // (e.g. connection abort/reset/broken pipe), log and exit gracefully
            // rather than treating it as a server error.
            Err(KvError::Io(ref e)) if is_disconnect(e) => {
                tracing::debug!(
                    component = "connection",
                    peer = %self.peer_addr,
                    error = %e,
                    "client disconnected before response could be sent"
                );
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(component = "connection", peer = %self.peer_addr, error = %e, "error writing response");
                Err(e)
            }
        }
    }
}

/// Read timeout (Windows uses TimedOut instead of WouldBlock)
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}
