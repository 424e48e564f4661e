//! Tests for opening a database from configuration
//!
//! These tests verify:
//! - State survives a close and reopen through WAL replay
//! - Replay does not append to the WAL
//! - Bad configuration is refused
//! - Server shutdown flushes the pending chunk; WAL cancellation does not

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use kvdb::config::{Config, EngineConfig};
use kvdb::network::{Server, TcpClient};
use kvdb::shutdown::{self, ShutdownSignal};
use kvdb::{Database, KvError};
use tempfile::TempDir;

fn config_for(wal_path: &Path) -> Config {
    Config::builder().wal_path(wal_path).wal_batch_size(2).build()
}

#[test]
fn test_state_survives_restart() {
    let temp = TempDir::new().unwrap();
    let config = config_for(&temp.path().join("wal.log"));

    let db = Database::open(&config, ShutdownSignal::never()).unwrap();
    db.execute("SET a 1").unwrap();
    db.execute("SET b 2").unwrap();
    db.execute("DEL a").unwrap();
    db.execute("SET b 3").unwrap();
    db.execute("SET c 4").unwrap();
    db.close().unwrap();

    let db = Database::open(&config, ShutdownSignal::never()).unwrap();
    assert!(matches!(db.execute("GET a"), Err(KvError::KeyNotFound(_))));
    assert_eq!(db.execute("GET b").unwrap().message, "3");
    assert_eq!(db.execute("GET c").unwrap().message, "4");
    db.close().unwrap();
}

#[test]
fn test_replay_does_not_grow_wal() {
    let temp = TempDir::new().unwrap();
    let wal_path = temp.path().join("wal.log");
    let config = config_for(&wal_path);

    let db = Database::open(&config, ShutdownSignal::never()).unwrap();
    db.execute("SET a 1").unwrap();
    db.execute("GET a").unwrap();
    db.close().unwrap();
    assert_eq!(fs::read_to_string(&wal_path).unwrap().lines().count(), 1);

    let db = Database::open(&config, ShutdownSignal::never()).unwrap();
    db.close().unwrap();
    assert_eq!(fs::read_to_string(&wal_path).unwrap().lines().count(), 1);
}

#[test]
fn test_replay_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    let mut config = config_for(&temp.path().join("wal.log"));

    let db = Database::open(&config, ShutdownSignal::never()).unwrap();
    db.execute("SET a 1").unwrap();
    db.close().unwrap();

    config.wal.replay_on_startup = false;
    let db = Database::open(&config, ShutdownSignal::never()).unwrap();
    assert!(db.execute("GET a").is_err());
    db.close().unwrap();
}

#[test]
fn test_unknown_engine_kind_is_refused() {
    let temp = TempDir::new().unwrap();
    let mut config = config_for(&temp.path().join("wal.log"));
    config.engine = EngineConfig {
        kind: "lsm".to_string(),
    };

    let err = Database::open(&config, ShutdownSignal::never()).err().unwrap();
    assert!(matches!(err, KvError::Config(_)));
}

// =============================================================================
// Shutdown
// =============================================================================

fn row_count(wal_path: &Path) -> usize {
    fs::read_to_string(wal_path).unwrap().lines().count()
}

#[test]
fn test_server_shutdown_flushes_pending_rows() {
    let temp = TempDir::new().unwrap();
    let wal_path = temp.path().join("wal.log");
    // default batch size: five writes never fill a chunk
    let config = Config::builder().wal_path(&wal_path).port(0).build();

    let database = Arc::new(Database::open(&config, ShutdownSignal::never()).unwrap());
    let server = Server::bind(config.server.clone(), database.clone()).unwrap();
    let addr = server.local_addr().unwrap();
    let (handle, signal) = shutdown::channel();
    let serving = thread::spawn(move || server.run_and_close(database, signal));

    let client = TcpClient::connect(addr).unwrap();
    for i in 0..5 {
        assert_eq!(client.call(&format!("SET k{} {}", i, i)).unwrap(), "");
    }
    assert_eq!(row_count(&wal_path), 0);

    // the client stays connected across shutdown
    handle.trigger();
    serving.join().unwrap().unwrap();
    assert_eq!(row_count(&wal_path), 5);

    let db = Database::open(&config, ShutdownSignal::never()).unwrap();
    assert_eq!(db.execute("GET k0").unwrap().message, "0");
    assert_eq!(db.execute("GET k4").unwrap().message, "4");
    db.close().unwrap();
}

#[test]
fn test_cancelled_wal_drops_pending_chunk() {
    let temp = TempDir::new().unwrap();
    let wal_path = temp.path().join("wal.log");
    let config = Config::builder().wal_path(&wal_path).build();
    let (handle, signal) = shutdown::channel();

    let db = Database::open(&config, signal).unwrap();
    for i in 0..5 {
        db.execute(&format!("SET k{} {}", i, i)).unwrap();
    }
    handle.trigger();
    db.close().unwrap();

    assert_eq!(row_count(&wal_path), 0);
}
