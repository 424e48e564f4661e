//! kvdb Server Binary
//!
//! Starts the TCP server for kvdb.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use kvdb::config::Overrides;
use kvdb::network::Server;
use kvdb::shutdown::{self, ShutdownHandle, ShutdownSignal};
use kvdb::{Config, Database};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, EnvFilter};

/// kvdb Server
///
/// Settings layer as flag > environment > config file > defaults.
#[derive(Parser, Debug)]
#[command(name = "kvdb-server")]
#[command(about = "Single-node key-value database server")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "KVDB_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "KVDB_HOST")]
    host: Option<String>,

    /// TCP port
    #[arg(short, long, env = "KVDB_PORT")]
    port: Option<u16>,

    /// Maximum concurrent connections (0 = default)
    #[arg(short, long, env = "KVDB_MAX_CONNECTIONS")]
    max_connections: Option<usize>,

    /// WAL file path
    #[arg(long, env = "KVDB_WAL_PATH")]
    wal_path: Option<PathBuf>,

    /// WAL entries per flushed chunk
    #[arg(long, env = "KVDB_WAL_BATCH_SIZE")]
    wal_batch_size: Option<usize>,

    /// Log filter when RUST_LOG is unset (e.g. "info", "debug")
    #[arg(long, env = "KVDB_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for kvdb.log, written alongside stdout
    #[arg(long, env = "KVDB_LOG_OUTPUT_DIR")]
    log_output_dir: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            max_connections: self.max_connections,
            wal_path: self.wal_path.clone(),
            wal_batch_size: self.wal_batch_size,
            log_level: self.log_level.clone(),
            log_output_dir: self.log_output_dir.clone(),
        }
    }
}

fn main() {
    let args = Args::parse();

    // Config comes first: it decides the log level
    let base = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("kvdb-server: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    let config = base.with_overrides(args.overrides());

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_file = match config.logging.open_log_file() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("kvdb-server: {}", e);
            std::process::exit(1);
        }
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match log_file {
        // stdout and the log file both get every line
        Some(file) => subscriber
            .with_ansi(false)
            .with_writer(io::stdout.and(Mutex::new(file)))
            .init(),
        None => subscriber.init(),
    }

    tracing::info!("kvdb Server v{}", kvdb::VERSION);
    tracing::info!("Listen address: {}", config.server.address());
    tracing::info!("WAL path: {}", config.wal.path.display());

    let (handle, signal) = shutdown::channel();
    if let Err(e) = install_signal_handler(handle.clone()) {
        tracing::warn!("Signal handler not installed: {}", e);
    }

    // Open database (replays the WAL). The WAL ignores the signal: it is
    // closed by the server once connections are done, flushing its chunk.
    let database = match Database::open(&config, ShutdownSignal::never()) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Database initialized successfully");

    // Start server
    let server = match Server::bind(config.server.clone(), database.clone()) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.server.address(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run_and_close(database, signal) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    drop(handle);
    tracing::info!("Server stopped");
}

/// Trigger shutdown on SIGINT/SIGTERM
#[cfg(unix)]
fn install_signal_handler(handle: ShutdownHandle) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    std::thread::Builder::new()
        .name("kvdb-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::info!("Received signal {}, initiating shutdown...", signal);
                handle.trigger();
            }
        })?;

    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handler(_handle: ShutdownHandle) -> std::io::Result<()> {
    Ok(())
}
