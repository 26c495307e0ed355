//! Domain types shared across the engine.
//!
//! [`Agent`] and [`Queue`] mirror the external directory and are read-only
//! to the orchestration core. [`AgentStatus`] is the live login state owned
//! by the status store; managers read-modify-write it through the store and
//! never cache it across workflow steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Telephony-layer identifier for an agent (`Agent/<number>`).
pub fn agent_interface(number: &str) -> String {
    format!("Agent/{number}")
}

/// A call-center operator identity, owned by the external directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    /// Human-dialable agent number, stable like the id.
    pub number: String,
    pub tenant_uuid: Uuid,
    /// Dialplan subroutine run before connecting calls to this agent.
    pub preprocess_subroutine: Option<String>,
    /// Queue memberships as (id, name) pairs.
    pub queues: Vec<AgentQueue>,
}

impl Agent {
    /// `Agent/<number>` interface string for telephony commands.
    pub fn interface(&self) -> String {
        agent_interface(&self.number)
    }

    pub fn is_member_of(&self, queue_name: &str) -> bool {
        self.queues.iter().any(|q| q.name == queue_name)
    }
}

/// A queue membership entry attached to an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentQueue {
    pub id: i64,
    pub name: String,
    pub penalty: i64,
}

/// A call queue, owned by the external directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queue {
    pub id: i64,
    pub name: String,
    pub tenant_uuid: Uuid,
}

/// Live login state of an agent.
///
/// Invariant: `logged == false` implies `extension`, `context` and
/// `login_at` are `None` and `paused == false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_id: i64,
    pub agent_number: String,
    pub tenant_uuid: Uuid,
    pub extension: Option<String>,
    pub context: Option<String>,
    pub logged: bool,
    pub paused: bool,
    pub paused_reason: Option<String>,
    pub login_at: Option<DateTime<Utc>>,
}

impl AgentStatus {
    pub fn interface(&self) -> String {
        agent_interface(&self.agent_number)
    }

    /// Seconds elapsed since login, truncated to whole seconds.
    pub fn logged_seconds(&self, now: DateTime<Utc>) -> i64 {
        match self.login_at {
            Some(login_at) => (now - login_at).num_seconds(),
            None => 0,
        }
    }
}

/// Pause details extracted from an inbound telephony event.
///
/// Ephemeral; built by the event handler from `MemberName`, `PausedReason`
/// and `Queue` fields and handed to the pause manager.
#[derive(Debug, Clone)]
pub struct PauseInfo {
    pub agent_id: i64,
    pub agent_number: String,
    pub reason: Option<String>,
    pub queue: String,
}
