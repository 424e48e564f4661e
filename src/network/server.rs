//! TCP Server
//!
//! Accepts connections and dispatches each to its own thread.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;

use crate::config::ServerConfig;
use crate::database::{Database, Executor};
use crate::error::{KvError, Result};
use crate::protocol::{write_response, Response};
use crate::shutdown::ShutdownSignal;
use super::{Connection, ConnectionRegistry};

/// How often the non-blocking accept loop re-checks for shutdown
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accepted connections waiting for the dispatch loop
const ACCEPT_QUEUE_CAPACITY: usize = 100;

/// How long `run_and_close` waits for connection threads to let go
pub const CONNECTION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP server for kvdb
///
/// ## Connection lifecycle
/// ```text
/// Accepted ──▶ Admitted ──▶ Streaming ──▶ Closed
///     └──────▶ Rejected ─────────────────▶ Closed
/// ```
/// Admission is decided in the connection's own thread, right before it
/// is served, against the registry's `max_connections`.
pub struct Server {
    config: ServerConfig,
    listener: TcpListener,
    executor: Arc<dyn Executor>,
    registry: Arc<ConnectionRegistry>,
}

impl Server {
    /// Bind the listener
    ///
    /// `max_connections == 0` is replaced by the default first. A bind
    /// failure is a startup error.
    pub fn bind(config: ServerConfig, executor: Arc<dyn Executor>) -> Result<Self> {
        let config = config.normalized();
        let address = config.address();

        let listener = TcpListener::bind(&address).map_err(|e| {
            tracing::error!(component = "tcp_server", %address, error = %e, "trying to run tcp server");
            e
        })?;

        // Non-blocking so the accept loop can observe shutdown
        listener.set_nonblocking(true)?;

        let registry = ConnectionRegistry::new(config.max_connections);

        Ok(Self {
            config,
            listener,
            executor,
            registry,
        })
    }

    /// The bound address (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared view of the admission registry
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Serve until `shutdown` fires (blocking)
    ///
    /// In-flight connections are not interrupted; they notice the signal
    /// at their next read poll.
    pub fn run(self, shutdown: ShutdownSignal) -> Result<()> {
        let Server {
            config,
            listener,
            executor,
            registry,
        } = self;

        tracing::info!(
            component = "tcp_server",
            address = %listener.local_addr()?,
            max_connections = config.max_connections,
            "server is running"
        );

        let (sender, receiver) = channel::bounded(ACCEPT_QUEUE_CAPACITY);
        let acceptor = spawn_acceptor(listener, sender, shutdown.clone())?;

        let dispatcher = Dispatcher {
            config,
            executor,
            registry,
            shutdown: shutdown.clone(),
        };
        dispatcher.run(receiver);

        if acceptor.join().is_err() {
            tracing::error!(component = "tcp_server", "accept loop panicked");
        }

        tracing::info!(component = "tcp_server", "server stopped");
        Ok(())
    }
}

impl Server {
    /// Serve until `shutdown` fires, then close `database` gracefully
    ///
    /// `database` must be the executor this server was bound with. Its WAL
    /// should not observe `shutdown` (open it with
    /// [`ShutdownSignal::never`]) so the pending chunk is still flushed
    /// here, after the last connection has stopped writing.
    pub fn run_and_close(self, database: Arc<Database>, shutdown: ShutdownSignal) -> Result<()> {
        self.run(shutdown)?;

        let deadline = Instant::now() + CONNECTION_DRAIN_TIMEOUT;
        let mut database = database;
        loop {
            match Arc::try_unwrap(database) {
                Ok(db) => {
                    db.close()?;
                    tracing::info!(component = "tcp_server", "WAL closed");
                    return Ok(());
                }
                Err(shared) if Instant::now() < deadline => {
                    // connection threads exit at their next read poll
                    database = shared;
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(_) => {
                    tracing::error!(
                        component = "tcp_server",
                        "connections still active, WAL not flushed"
                    );
                    return Err(KvError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "connections did not finish before WAL close",
                    )));
                }
            }
        }
    }
}

// =============================================================================
// Accept loop
// =============================================================================

fn spawn_acceptor(
    listener: TcpListener,
    sender: Sender<(TcpStream, SocketAddr)>,
    shutdown: ShutdownSignal,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("kvdb-accept".to_string())
        .spawn(move || accept_loop(listener, sender, shutdown))?;
    Ok(handle)
}

/// Feed accepted connections into the queue until shutdown
///
/// Accept errors are logged and never end the loop.
fn accept_loop(
    listener: TcpListener,
    sender: Sender<(TcpStream, SocketAddr)>,
    shutdown: ShutdownSignal,
) {
    loop {
        if shutdown.is_triggered() {
            return;
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                if sender.send((stream, peer)).is_err() {
                    // dispatch loop is gone
                    return;
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if shutdown.wait_timeout(ACCEPT_POLL_INTERVAL) {
                    return;
                }
            }
            Err(e) => {
                tracing::error!(component = "tcp_server", error = %e, "trying to accept connection");
                if shutdown.wait_timeout(ACCEPT_POLL_INTERVAL) {
                    return;
                }
            }
        }
    }
}

// =============================================================================
// Dispatch loop
// =============================================================================

struct Dispatcher {
    config: ServerConfig,
    executor: Arc<dyn Executor>,
    registry: Arc<ConnectionRegistry>,
    shutdown: ShutdownSignal,
}

impl Dispatcher {
    /// Hand each queued connection to its own thread until shutdown
    fn run(&self, receiver: Receiver<(TcpStream, SocketAddr)>) {
        loop {
            select! {
                recv(receiver) -> msg => match msg {
                    Ok((stream, peer)) => self.dispatch(stream, peer),
                    Err(_) => return,
                },
                recv(self.shutdown.receiver()) -> _ => {
                    tracing::warn!(component = "tcp_server", "server stopped by cancellation");
                    return;
                }
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let config = self.config.clone();
        let executor = Arc::clone(&self.executor);
        let registry = Arc::clone(&self.registry);
        let shutdown = self.shutdown.clone();

        let spawned = thread::Builder::new()
            .name(format!("kvdb-conn-{}", peer))
            .spawn(move || serve(stream, peer, config, executor, registry, shutdown));

        if let Err(e) = spawned {
            tracing::error!(component = "tcp_server", %peer, error = %e, "failed to spawn connection thread");
        }
    }
}

/// Per-connection thread body
///
/// The registry slot is released when `admission` drops, on every exit
/// path, panics included.
fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    config: ServerConfig,
    executor: Arc<dyn Executor>,
    registry: Arc<ConnectionRegistry>,
    shutdown: ShutdownSignal,
) {
    // Accepted sockets may inherit the listener's non-blocking mode
    if let Err(e) = stream.set_nonblocking(false) {
        tracing::warn!(component = "tcp_server", %peer, error = %e, "cannot configure connection");
        return;
    }

    let Some(admission) = registry.try_admit(peer) else {
        reject(stream, peer, registry.max_connections());
        return;
    };

    tracing::info!(component = "tcp_server", %peer, active = registry.len(), "new connection");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        Connection::new(stream, executor, &config, shutdown).and_then(|mut conn| conn.handle())
    }));

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(component = "tcp_server", %peer, error = %e, "trying to handle connection")
        }
        Err(_) => tracing::error!(component = "tcp_server", %peer, "connection thread panicked"),
    }

    drop(admission);
    tracing::info!(component = "tcp_server", %peer, "connection closed");
}

/// Send the capacity line and close without registering
fn reject(mut stream: TcpStream, peer: SocketAddr, max_connections: usize) {
    let refusal = KvError::Capacity;
    tracing::warn!(component = "tcp_server", %peer, max_connections, error = %refusal, "rejecting connection");

    let response = Response::from_outcome("", Err(refusal));
    if let Err(e) = write_response(&mut stream, &response) {
        tracing::debug!(component = "tcp_server", %peer, error = %e, "trying to reject connection");
    }
}
