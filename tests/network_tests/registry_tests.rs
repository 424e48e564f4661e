//! Tests for the connection registry
//!
//! These tests verify:
//! - Admission up to the limit and refusal beyond it
//! - Slot release on drop
//! - No over-admission under racing threads

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use kvdb::network::ConnectionRegistry;

fn peer(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[test]
fn test_admits_up_to_limit() {
    let registry = ConnectionRegistry::new(2);

    let first = registry.try_admit(peer(1)).unwrap();
    let second = registry.try_admit(peer(2)).unwrap();

    assert!(registry.try_admit(peer(3)).is_none());
    assert_eq!(registry.len(), 2);
    assert_eq!(first.peer(), peer(1));
    assert_eq!(second.peer(), peer(2));
}

#[test]
fn test_drop_releases_slot() {
    let registry = ConnectionRegistry::new(1);

    let admission = registry.try_admit(peer(1)).unwrap();
    assert!(registry.try_admit(peer(2)).is_none());

    drop(admission);
    assert!(registry.is_empty());
    assert!(registry.try_admit(peer(2)).is_some());
}

#[test]
fn test_slot_released_on_panic() {
    let registry = ConnectionRegistry::new(1);

    let worker = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            let _admission = registry.try_admit(peer(1)).unwrap();
            panic!("handler blew up");
        })
    };

    assert!(worker.join().is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_racing_admissions_never_exceed_limit() {
    let registry = ConnectionRegistry::new(4);

    let handles: Vec<_> = (0..16u16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.try_admit(peer(1000 + i)))
        })
        .collect();

    let admitted: Vec<_> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(admitted.len(), 4);
    assert_eq!(registry.len(), 4);

    drop(admitted);
    assert!(registry.is_empty());
}
