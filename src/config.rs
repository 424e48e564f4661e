//! Configuration for kvdb
//!
//! Centralized configuration with sensible defaults. Every section can be
//! loaded from a TOML file; absent fields keep their defaults.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! max_connections = 100
//!
//! [wal]
//! path = "./kvdb_data/wal.log"
//! batch_size = 100
//!
//! [logging]
//! level = "debug"
//! output_dir = "./kvdb_data/logs"
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{KvError, Result};

/// Main configuration for a kvdb instance
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub wal: WalConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Server
// =============================================================================

/// Connection server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// TCP port (0 picks an ephemeral port)
    pub port: u16,

    /// Max concurrent client connections (0 means "use the default")
    pub max_connections: usize,

    /// Longest accepted request line in bytes, newline excluded
    pub max_message_size: usize,

    /// Close connections silent for this long (milliseconds, 0 = never)
    pub idle_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl ServerConfig {
    pub const DEFAULT_MAX_CONNECTIONS: usize = 100;
    pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4096;

    /// `host:port` as accepted by `TcpListener::bind`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Replace zero limits with their built-in defaults
    pub fn normalized(mut self) -> Self {
        if self.max_connections == 0 {
            self.max_connections = Self::DEFAULT_MAX_CONNECTIONS;
        }
        if self.max_message_size == 0 {
            self.max_message_size = Self::DEFAULT_MAX_MESSAGE_SIZE;
        }
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            max_message_size: Self::DEFAULT_MAX_MESSAGE_SIZE,
            idle_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

// =============================================================================
// WAL
// =============================================================================

/// Write-ahead log settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalConfig {
    /// Append-only log file, created if absent
    pub path: PathBuf,

    /// Entries per chunk; a full chunk is flushed in one append
    pub batch_size: usize,

    /// Capacity of the bounded queue in front of the drain thread
    pub queue_capacity: usize,

    /// fsync after every chunk append
    pub sync_on_flush: bool,

    /// Replay the log into the engine before serving
    pub replay_on_startup: bool,
}

impl WalConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 100;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

    /// Replace zero sizes with their built-in defaults
    pub fn normalized(mut self) -> Self {
        if self.batch_size == 0 {
            self.batch_size = Self::DEFAULT_BATCH_SIZE;
        }
        if self.queue_capacity == 0 {
            self.queue_capacity = Self::DEFAULT_QUEUE_CAPACITY;
        }
        self
    }
}

impl Default for WalConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./kvdb_data/wal.log"),
            batch_size: Self::DEFAULT_BATCH_SIZE,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            sync_on_flush: false,
            replay_on_startup: true,
        }
    }
}

// =============================================================================
// Engine / Logging
// =============================================================================

/// Storage engine selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub kind: String,
}

impl EngineConfig {
    pub const IN_MEMORY: &'static str = "in_memory";
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: Self::IN_MEMORY.to_string(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Also append logs to `<output_dir>/kvdb.log` (stdout only when unset)
    pub output_dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub const LOG_FILE_NAME: &'static str = "kvdb.log";

    /// Where file logs go, if enabled
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(Self::LOG_FILE_NAME))
    }

    /// Create the output directory and open the log file for append
    pub fn open_log_file(&self) -> Result<Option<File>> {
        let Some(path) = self.log_file_path() else {
            return Ok(None);
        };

        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir).map_err(|e| {
                KvError::Config(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| KvError::Config(format!("cannot open {}: {}", path.display(), e)))?;

        Ok(Some(file))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output_dir: None,
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(raw).map_err(|e| KvError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            KvError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Reject settings no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.engine.kind != EngineConfig::IN_MEMORY {
            return Err(KvError::Config(format!(
                "unsupported engine kind: {}",
                self.engine.kind
            )));
        }
        if self.server.host.is_empty() {
            return Err(KvError::Config("server.host must not be empty".to_string()));
        }
        if self.wal.path.as_os_str().is_empty() {
            return Err(KvError::Config("wal.path must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Values given on the command line or in the environment
///
/// Each `Some` overwrites what the file (or the defaults) said.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_connections: Option<usize>,
    pub wal_path: Option<PathBuf>,
    pub wal_batch_size: Option<usize>,
    pub log_level: Option<String>,
    pub log_output_dir: Option<PathBuf>,
}

impl Config {
    /// Layer overrides on top of this config and normalize the result
    pub fn with_overrides(self, overrides: Overrides) -> Config {
        let mut builder = ConfigBuilder::from_config(self);
        if let Some(host) = overrides.host {
            builder = builder.host(host);
        }
        if let Some(port) = overrides.port {
            builder = builder.port(port);
        }
        if let Some(count) = overrides.max_connections {
            builder = builder.max_connections(count);
        }
        if let Some(path) = overrides.wal_path {
            builder = builder.wal_path(path);
        }
        if let Some(size) = overrides.wal_batch_size {
            builder = builder.wal_batch_size(size);
        }
        if let Some(level) = overrides.log_level {
            builder = builder.log_level(level);
        }
        if let Some(dir) = overrides.log_output_dir {
            builder = builder.log_output_dir(dir);
        }
        builder.build()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from an already loaded config
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the interface to bind
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.server.max_connections = count;
        self
    }

    /// Set the maximum request line size (in bytes)
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.config.server.max_message_size = bytes;
        self
    }

    /// Set the idle timeout (in milliseconds)
    pub fn idle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.server.idle_timeout_ms = ms;
        self
    }

    /// Set the WAL file path
    pub fn wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wal.path = path.into();
        self
    }

    /// Set the WAL chunk size
    pub fn wal_batch_size(mut self, size: usize) -> Self {
        self.config.wal.batch_size = size;
        self
    }

    /// Set the WAL queue capacity
    pub fn wal_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.wal.queue_capacity = capacity;
        self
    }

    /// fsync after every chunk flush
    pub fn wal_sync_on_flush(mut self, sync: bool) -> Self {
        self.config.wal.sync_on_flush = sync;
        self
    }

    /// Set the default log filter
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Also write logs to a file in this directory
    pub fn log_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.logging.output_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Config {
        let mut config = self.config;
        config.server = config.server.normalized();
        config.wal = config.wal.normalized();
        config
    }
}
