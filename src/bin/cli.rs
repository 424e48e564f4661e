//! kvdb CLI Client
//!
//! Interactive shell for kvdb, against a server or an embedded database.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use kvdb::network::TcpClient;
use kvdb::repl::Repl;
use kvdb::shutdown::{self, ShutdownSignal};
use kvdb::{Config, Database, Executor};
use tracing_subscriber::{fmt, EnvFilter};

/// kvdb CLI
#[derive(Parser, Debug)]
#[command(name = "kvdb-cli")]
#[command(about = "Interactive shell for the kvdb key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, env = "KVDB_ADDR", default_value = "127.0.0.1:8000")]
    server: String,

    /// Skip the network and run an in-process database over this WAL file
    #[arg(long, value_name = "WAL_PATH")]
    embedded: Option<PathBuf>,
}

fn main() {
    // Logs go to stderr so they never mix with REPL output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();
    let (_handle, signal) = shutdown::channel();

    let outcome = match args.embedded {
        Some(wal_path) => run_embedded(wal_path, signal),
        None => TcpClient::connect(&args.server).and_then(|client| run(client, signal).map(|_| ())),
    };

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        eprintln!("kvdb-cli: {}", e);
        std::process::exit(1);
    }
}

fn run_embedded(wal_path: PathBuf, signal: ShutdownSignal) -> kvdb::Result<()> {
    let config = Config::builder().wal_path(wal_path).build();
    let database = Database::open(&config, ShutdownSignal::never())?;
    run(database, signal)?.close()
}

/// Drive the REPL over stdin/stdout and hand the executor back
fn run<E: Executor>(executor: E, signal: ShutdownSignal) -> kvdb::Result<E> {
    let repl = Repl::new(executor, signal);
    repl.run(&mut io::stdin().lock(), &mut io::stdout().lock())?;
    Ok(repl.into_executor())
}
