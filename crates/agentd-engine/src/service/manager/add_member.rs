//! Agent queue membership, add side.
//!
//! Membership is persisted unconditionally; the telephony `QueueAdd` is
//! only issued when the agent is currently logged, so a logged-out agent
//! picks the membership up at next login.

use std::sync::Arc;

use tracing::info;

use crate::agent::{Agent, Queue};
use crate::ami::{AmiAction, AmiClient};
use crate::bus::{AgentEvent, EventPublisher};
use crate::database::{AgentStatusStore, QueueMemberStore};
use crate::error::{AgentServerError, Result};
use crate::service::manager::send_checked;

pub struct AddMemberManager {
    ami: Arc<dyn AmiClient>,
    status_store: AgentStatusStore,
    member_store: QueueMemberStore,
    publisher: Arc<dyn EventPublisher>,
}

impl AddMemberManager {
    pub fn new(
        ami: Arc<dyn AmiClient>,
        status_store: AgentStatusStore,
        member_store: QueueMemberStore,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            ami,
            status_store,
            member_store,
            publisher,
        }
    }

    pub async fn add_agent_to_queue(&self, agent: &Agent, queue: &Queue) -> Result<()> {
        if agent.is_member_of(&queue.name) {
            return Err(AgentServerError::AgentAlreadyInQueue);
        }

        info!("adding agent {} to queue {}", agent.number, queue.name);
        self.member_store
            .add_agent_to_queue(agent.id, &agent.number, queue.id, &queue.name)
            .await?;

        self.publisher
            .publish(AgentEvent::AgentAddedToQueue {
                agent_id: agent.id,
                agent_number: agent.number.clone(),
                queue_name: queue.name.clone(),
            })
            .await?;

        let status = self.status_store.get_status(agent.id, None).await?;
        if status.map(|s| s.logged).unwrap_or(false) {
            let interface = agent.interface();
            send_checked(
                &*self.ami,
                AmiAction::queue_add(&queue.name, &interface, Some(&interface), None, Some(0)),
            )
            .await?;
        }
        Ok(())
    }
}
