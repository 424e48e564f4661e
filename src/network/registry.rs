//! Connection registry
//!
//! Admission control for the server: a bounded set of active peers.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;

/// Set of admitted peers, bounded by `max_connections`
///
/// Owned by the server. Per-connection threads never touch the set
/// directly; they only hold an [`Admission`] whose drop releases the slot.
#[derive(Debug)]
pub struct ConnectionRegistry {
    active: Mutex<HashSet<SocketAddr>>,
    max_connections: usize,
}

impl ConnectionRegistry {
    pub fn new(max_connections: usize) -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(HashSet::with_capacity(max_connections)),
            max_connections,
        })
    }

    /// Claim a slot for `peer`; `None` when the registry is full
    ///
    /// Check and insert happen under one lock, so two racing connections
    /// cannot both take the last slot.
    pub fn try_admit(self: &Arc<Self>, peer: SocketAddr) -> Option<Admission> {
        let mut active = self.active.lock();
        if active.len() >= self.max_connections {
            return None;
        }
        active.insert(peer);

        Some(Admission {
            registry: Arc::clone(self),
            peer,
        })
    }

    /// Number of admitted connections
    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    fn release(&self, peer: &SocketAddr) {
        self.active.lock().remove(peer);
    }
}

/// A held registry slot, released on drop (including panic unwinds)
#[derive(Debug)]
pub struct Admission {
    registry: Arc<ConnectionRegistry>,
    peer: SocketAddr,
}

impl Admission {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.registry.release(&self.peer);
    }
}
