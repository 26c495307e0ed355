//! Domain events published on the bus.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything the engine tells the rest of the platform about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "snake_case")]
pub enum AgentEvent {
    AgentLoggedIn {
        agent_id: i64,
        agent_number: String,
        tenant_uuid: Uuid,
        extension: String,
        context: String,
    },
    AgentLoggedOff {
        agent_id: i64,
        agent_number: String,
        tenant_uuid: Uuid,
    },
    AgentPaused {
        agent_id: i64,
        agent_number: String,
        reason: Option<String>,
        /// Queue the pause applies to; `None` means all queues.
        queue: Option<String>,
    },
    AgentUnpaused {
        agent_id: i64,
        agent_number: String,
        reason: Option<String>,
        queue: Option<String>,
    },
    AgentAddedToQueue {
        agent_id: i64,
        agent_number: String,
        queue_name: String,
    },
    AgentRemovedFromQueue {
        agent_id: i64,
        agent_number: String,
        queue_name: String,
    },
    QueueAdded {
        queue_id: i64,
    },
    QueueUpdated {
        queue_id: i64,
    },
    QueueDeleted {
        queue_id: i64,
    },
}

impl AgentEvent {
    /// Stable event name used in payloads and routing keys.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AgentLoggedIn { .. } => "agent_logged_in",
            Self::AgentLoggedOff { .. } => "agent_logged_off",
            Self::AgentPaused { .. } => "agent_paused",
            Self::AgentUnpaused { .. } => "agent_unpaused",
            Self::AgentAddedToQueue { .. } => "agent_added_to_queue",
            Self::AgentRemovedFromQueue { .. } => "agent_removed_from_queue",
            Self::QueueAdded { .. } => "queue_added",
            Self::QueueUpdated { .. } => "queue_updated",
            Self::QueueDeleted { .. } => "queue_deleted",
        }
    }

    pub fn routing_key(&self) -> String {
        format!("status.agent.{}", self.name())
    }
}
