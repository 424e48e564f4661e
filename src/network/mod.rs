//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Non-blocking accept thread feeding a bounded queue
//! - Dispatch loop spawning one thread per connection
//! - Admission control through a bounded registry
//! - Commands routed through the `Executor` capability

mod server;
mod connection;
mod registry;
mod client;

pub use server::{Server, ACCEPT_POLL_INTERVAL, CONNECTION_DRAIN_TIMEOUT};
pub use connection::{Connection, READ_POLL_INTERVAL};
pub use registry::{Admission, ConnectionRegistry};
pub use client::TcpClient;
