use uuid::Uuid;

use crate::agent::{Agent, AgentStatus};
use crate::database::{AgentDirectory, AgentStatusStore};
use crate::error::Result;

pub struct StatusHandler {
    directory: AgentDirectory,
    status_store: AgentStatusStore,
}

impl StatusHandler {
    pub fn new(directory: AgentDirectory, status_store: AgentStatusStore) -> Self {
        Self {
            directory,
            status_store,
        }
    }

    pub async fn get_by_id(
        &self,
        agent_id: i64,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<AgentStatus> {
        let agent = self.directory.get_agent(agent_id, tenant_uuids).await?;
        self.status_for(&agent).await
    }

    pub async fn get_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<AgentStatus> {
        let agent = self
            .directory
            .get_agent_by_number(agent_number, tenant_uuids)
            .await?;
        self.status_for(&agent).await
    }

    pub async fn list(&self, tenant_uuids: Option<&[Uuid]>) -> Result<Vec<AgentStatus>> {
        let agents = self.directory.list_agents(tenant_uuids).await?;
        let mut statuses = Vec::with_capacity(agents.len());
        for agent in &agents {
            statuses.push(self.status_for(agent).await?);
        }
        Ok(statuses)
    }

    /// Agents with no status row yet report as logged out.
    async fn status_for(&self, agent: &Agent) -> Result<AgentStatus> {
        let status = self.status_store.get_status(agent.id, None).await?;
        Ok(status.unwrap_or_else(|| offline_status(agent)))
    }
}

fn offline_status(agent: &Agent) -> AgentStatus {
    AgentStatus {
        agent_id: agent.id,
        agent_number: agent.number.clone(),
        tenant_uuid: agent.tenant_uuid,
        extension: None,
        context: None,
        logged: false,
        paused: false,
        paused_reason: None,
        login_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbManager;

    #[tokio::test]
    async fn unknown_agent_is_not_found() {
        let db = DbManager::new_in_memory().await.unwrap();
        let handler = StatusHandler::new(db.agent_directory(), db.agent_status_store());

        let err = handler.get_by_id(42, None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn agent_without_status_row_reports_logged_out() {
        let db = DbManager::new_in_memory().await.unwrap();
        let agent = db
            .agent_directory()
            .insert_agent("1001", Uuid::new_v4(), None)
            .await
            .unwrap();
        let handler = StatusHandler::new(db.agent_directory(), db.agent_status_store());

        let status = handler.get_by_id(agent.id, None).await.unwrap();
        assert!(!status.logged);
        assert_eq!(status.agent_number, "1001");
        assert!(status.extension.is_none());
    }

    #[tokio::test]
    async fn list_covers_every_agent() {
        let db = DbManager::new_in_memory().await.unwrap();
        let tenant = Uuid::new_v4();
        db.agent_directory().insert_agent("1001", tenant, None).await.unwrap();
        db.agent_directory().insert_agent("1002", tenant, None).await.unwrap();
        let handler = StatusHandler::new(db.agent_directory(), db.agent_status_store());

        let statuses = handler.list(None).await.unwrap();
        assert_eq!(statuses.len(), 2);
    }
}
