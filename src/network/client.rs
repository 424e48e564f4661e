//! TCP Client
//!
//! Line-protocol client; implements [`Executor`] so the REPL can drive a
//! remote server exactly like an embedded database.

use std::io::{self, BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use parking_lot::Mutex;

use crate::database::Executor;
use crate::error::{KvError, Result};
use crate::protocol::{read_line, write_line, QueryResult};

/// A connected client; one request in flight at a time
pub struct TcpClient {
    inner: Mutex<Stream>,
}

struct Stream {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl TcpClient {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let reader = BufReader::new(stream.try_clone()?);

        tracing::info!(component = "tcp_client", peer = %peer_addr, "tcp client is started");

        Ok(Self {
            inner: Mutex::new(Stream {
                reader,
                writer: BufWriter::new(stream),
            }),
        })
    }

    /// Send one request line and wait for its response line
    pub fn call(&self, command: &str) -> Result<String> {
        let mut stream = self.inner.lock();

        write_line(&mut stream.writer, command.trim())?;

        read_line(&mut stream.reader)?.ok_or_else(|| {
            KvError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ))
        })
    }
}

impl Executor for TcpClient {
    fn execute(&self, raw: &str) -> Result<QueryResult> {
        self.call(raw).map(QueryResult::new)
    }
}
