//! Bus consumption and connection health.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::BusMessage;
use crate::status::Status;

/// Subscribes to bus messages and tracks connection health.
///
/// The `connected` flag feeds the `bus_consumer` entry of the composable
/// health check: it goes up when the dispatch loop is receiving and drops
/// when the channel closes underneath it.
#[derive(Clone)]
pub struct BusConsumer {
    tx: broadcast::Sender<BusMessage>,
    connected: Arc<AtomicBool>,
}

impl BusConsumer {
    pub fn new(tx: broadcast::Sender<BusMessage>) -> Self {
        Self {
            tx,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn provide_status(&self) -> Status {
        if self.is_connected() {
            Status::Ok
        } else {
            Status::Fail
        }
    }
}
