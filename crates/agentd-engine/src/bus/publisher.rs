//! Event publishing.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::bus::{AgentEvent, BusMessage};
use crate::error::{AgentServerError, Result};

/// Publishes domain events, fire-and-forget from the managers' side.
///
/// Delivery guarantees belong to the bus; a publish only fails when the
/// event cannot be handed to the transport at all.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: AgentEvent) -> Result<()>;
}

/// Publisher over the in-process broadcast bus.
#[derive(Clone)]
pub struct BusPublisher {
    tx: broadcast::Sender<BusMessage>,
}

impl BusPublisher {
    pub fn new(tx: broadcast::Sender<BusMessage>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl EventPublisher for BusPublisher {
    async fn publish(&self, event: AgentEvent) -> Result<()> {
        let routing_key = event.routing_key();
        let payload = serde_json::to_value(&event)
            .map_err(|e| AgentServerError::Bus(format!("event serialization failed: {e}")))?;
        debug!("publishing {} on {}", event.name(), routing_key);
        // No subscribers is fine; the bus just drops the message.
        let _ = self.tx.send(BusMessage::new(routing_key, payload));
        Ok(())
    }
}
