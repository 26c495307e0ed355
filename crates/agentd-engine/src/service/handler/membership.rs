use std::sync::Arc;

use uuid::Uuid;

use crate::database::AgentDirectory;
use crate::error::Result;
use crate::service::lock::AgentLocks;
use crate::service::manager::{AddMemberManager, RemoveMemberManager};

pub struct MembershipHandler {
    directory: AgentDirectory,
    add: Arc<AddMemberManager>,
    remove: Arc<RemoveMemberManager>,
    locks: Arc<AgentLocks>,
}

impl MembershipHandler {
    pub fn new(
        directory: AgentDirectory,
        add: Arc<AddMemberManager>,
        remove: Arc<RemoveMemberManager>,
        locks: Arc<AgentLocks>,
    ) -> Self {
        Self {
            directory,
            add,
            remove,
            locks,
        }
    }

    pub async fn add_agent_to_queue(
        &self,
        agent_id: i64,
        queue_id: i64,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self.directory.get_agent(agent_id, tenant_uuids).await?;
        let queue = self.directory.get_queue(queue_id).await?;
        let _guard = self.locks.hold(agent.id).await;
        self.add.add_agent_to_queue(&agent, &queue).await
    }

    pub async fn remove_agent_from_queue(
        &self,
        agent_id: i64,
        queue_id: i64,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self.directory.get_agent(agent_id, tenant_uuids).await?;
        let queue = self.directory.get_queue(queue_id).await?;
        let _guard = self.locks.hold(agent.id).await;
        self.remove.remove_agent_from_queue(&agent, &queue).await
    }
}
