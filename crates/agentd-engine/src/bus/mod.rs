//! Message bus integration.
//!
//! Domain events go out through an [`EventPublisher`]; telephony
//! notifications (queue member pause/unpause, queue configuration changes)
//! come back in through a [`BusConsumer`]. The transport is an in-process
//! broadcast channel behind narrow seams, so swapping in an external broker
//! only touches this module.

pub mod consumer;
pub mod events;
pub mod publisher;

pub use consumer::BusConsumer;
pub use events::AgentEvent;
pub use publisher::{BusPublisher, EventPublisher};

use serde_json::Value;

/// A raw message moving across the bus.
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// Dotted routing key, e.g. `ami.QueueMemberPause` or `status.agent.login`.
    pub routing_key: String,
    pub payload: Value,
}

impl BusMessage {
    pub fn new(routing_key: impl Into<String>, payload: Value) -> Self {
        Self {
            routing_key: routing_key.into(),
            payload,
        }
    }
}
