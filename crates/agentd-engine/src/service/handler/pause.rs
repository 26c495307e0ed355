use std::sync::Arc;

use uuid::Uuid;

use crate::agent::{Agent, AgentStatus};
use crate::database::{AgentDirectory, AgentStatusStore};
use crate::error::{AgentServerError, Result};
use crate::service::lock::AgentLocks;
use crate::service::manager::PauseManager;

pub struct PauseHandler {
    directory: AgentDirectory,
    status_store: AgentStatusStore,
    manager: Arc<PauseManager>,
    locks: Arc<AgentLocks>,
}

impl PauseHandler {
    pub fn new(
        directory: AgentDirectory,
        status_store: AgentStatusStore,
        manager: Arc<PauseManager>,
        locks: Arc<AgentLocks>,
    ) -> Self {
        Self {
            directory,
            status_store,
            manager,
            locks,
        }
    }

    pub async fn pause_by_id(
        &self,
        agent_id: i64,
        reason: Option<&str>,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self.directory.get_agent(agent_id, tenant_uuids).await?;
        self.pause(&agent, reason).await
    }

    pub async fn pause_by_number(
        &self,
        agent_number: &str,
        reason: Option<&str>,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self
            .directory
            .get_agent_by_number(agent_number, tenant_uuids)
            .await?;
        self.pause(&agent, reason).await
    }

    pub async fn unpause_by_id(&self, agent_id: i64, tenant_uuids: Option<&[Uuid]>) -> Result<()> {
        let agent = self.directory.get_agent(agent_id, tenant_uuids).await?;
        self.unpause(&agent).await
    }

    pub async fn unpause_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self
            .directory
            .get_agent_by_number(agent_number, tenant_uuids)
            .await?;
        self.unpause(&agent).await
    }

    async fn pause(&self, agent: &Agent, reason: Option<&str>) -> Result<()> {
        let _guard = self.locks.hold(agent.id).await;
        let status = self.current_status(agent.id).await?;
        self.manager.pause_agent(&status, reason).await
    }

    async fn unpause(&self, agent: &Agent) -> Result<()> {
        let _guard = self.locks.hold(agent.id).await;
        let status = self.current_status(agent.id).await?;
        self.manager.unpause_agent(&status).await
    }

    /// Read inside the agent's lock, so the snapshot reflects any workflow
    /// that finished while we waited for it.
    async fn current_status(&self, agent_id: i64) -> Result<AgentStatus> {
        self.status_store
            .get_status(agent_id, None)
            .await?
            .ok_or(AgentServerError::AgentNotLogged)
    }
}
