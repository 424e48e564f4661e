//! Process-wide cancellation
//!
//! A closed crossbeam channel is the signal: nothing is ever sent, the
//! handle simply drops its sender. Every clone of the receiver then sees
//! `Disconnected`, which works both for polling and inside `select!`.

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

/// Create a linked trigger/observer pair
pub fn channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = bounded(0);
    let handle = ShutdownHandle {
        sender: Arc::new(Mutex::new(Some(tx))),
    };
    (
        handle,
        ShutdownSignal {
            receiver: rx,
            _keepalive: None,
        },
    )
}

/// Trigger side. Dropping every clone also counts as a trigger.
#[derive(Clone)]
pub struct ShutdownHandle {
    sender: Arc<Mutex<Option<Sender<()>>>>,
}

impl ShutdownHandle {
    /// Fire the signal. Idempotent.
    pub fn trigger(&self) {
        self.sender.lock().take();
    }
}

/// Observer side, cheap to clone into every thread
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: Receiver<()>,

    /// Held only by `never()` so the channel cannot disconnect
    _keepalive: Option<Sender<()>>,
}

impl ShutdownSignal {
    /// A signal that never fires, for components run without a governor
    pub fn never() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            receiver: rx,
            _keepalive: Some(tx),
        }
    }

    /// Non-blocking check
    pub fn is_triggered(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleep for up to `timeout`, waking early on shutdown.
    ///
    /// Returns true if the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    /// Receiver for use in `crossbeam::select!`
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}
