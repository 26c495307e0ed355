use std::sync::Arc;

use uuid::Uuid;

use crate::agent::Agent;
use crate::database::{AgentDirectory, AgentStatusStore};
use crate::error::{AgentServerError, Result};
use crate::service::lock::AgentLocks;
use crate::service::manager::{LogoffManager, RelogManager};

pub struct LogoffHandler {
    directory: AgentDirectory,
    status_store: AgentStatusStore,
    manager: Arc<LogoffManager>,
    relog: Arc<RelogManager>,
    locks: Arc<AgentLocks>,
}

impl LogoffHandler {
    pub fn new(
        directory: AgentDirectory,
        status_store: AgentStatusStore,
        manager: Arc<LogoffManager>,
        relog: Arc<RelogManager>,
        locks: Arc<AgentLocks>,
    ) -> Self {
        Self {
            directory,
            status_store,
            manager,
            relog,
            locks,
        }
    }

    pub async fn logoff_by_id(&self, agent_id: i64, tenant_uuids: Option<&[Uuid]>) -> Result<()> {
        let agent = self.directory.get_agent(agent_id, tenant_uuids).await?;
        self.logoff(&agent).await
    }

    pub async fn logoff_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self
            .directory
            .get_agent_by_number(agent_number, tenant_uuids)
            .await?;
        self.logoff(&agent).await
    }

    pub async fn logoff_all(&self) -> Result<()> {
        self.manager.logoff_all_agents().await
    }

    pub async fn relog_all(&self) -> Result<()> {
        self.relog.relog_all_agents().await
    }

    /// The status snapshot is read inside the lock, so a workflow that
    /// completed while we waited is visible here and a second logoff is
    /// rejected instead of replayed.
    async fn logoff(&self, agent: &Agent) -> Result<()> {
        let _guard = self.locks.hold(agent.id).await;
        let status = self
            .status_store
            .get_status(agent.id, None)
            .await?
            .ok_or(AgentServerError::AgentNotLogged)?;
        self.manager.logoff_agent(&status).await
    }
}
