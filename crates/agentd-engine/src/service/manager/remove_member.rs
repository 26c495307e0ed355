//! Agent queue membership, remove side.

use std::sync::Arc;

use tracing::info;

use crate::agent::{Agent, Queue};
use crate::ami::{AmiAction, AmiClient};
use crate::bus::{AgentEvent, EventPublisher};
use crate::database::{AgentStatusStore, QueueMemberStore};
use crate::error::{AgentServerError, Result};
use crate::service::manager::send_checked;

pub struct RemoveMemberManager {
    ami: Arc<dyn AmiClient>,
    status_store: AgentStatusStore,
    member_store: QueueMemberStore,
    publisher: Arc<dyn EventPublisher>,
}

impl RemoveMemberManager {
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

    pub async fn remove_agent_from_queue(&self, agent: &Agent, queue: &Queue) -> Result<()> {
        if !agent.is_member_of(&queue.name) {
            return Err(AgentServerError::AgentNotInQueue);
        }

        info!("removing agent {} from queue {}", agent.number, queue.name);
        let status = self.status_store.get_status(agent.id, None).await?;
        if status.map(|s| s.logged).unwrap_or(false) {
            send_checked(
                &*self.ami,
                AmiAction::queue_remove(&queue.name, &agent.interface()),
            )
            .await?;
        }

        self.member_store
            .remove_agent_from_queue(agent.id, &queue.name)
            .await?;

        self.publisher
            .publish(AgentEvent::AgentRemovedFromQueue {
                agent_id: agent.id,
                agent_number: agent.number.clone(),
                queue_name: queue.name.clone(),
            })
            .await
    }
}
