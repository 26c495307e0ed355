use std::sync::Arc;

use uuid::Uuid;

use crate::agent::Agent;
use crate::database::AgentDirectory;
use crate::error::{AgentServerError, Result};
use crate::service::lock::AgentLocks;
use crate::service::manager::LoginManager;

pub struct LoginHandler {
    directory: AgentDirectory,
    manager: Arc<LoginManager>,
    locks: Arc<AgentLocks>,
}

impl LoginHandler {
    pub fn new(
        directory: AgentDirectory,
        manager: Arc<LoginManager>,
        locks: Arc<AgentLocks>,
    ) -> Self {
        Self {
            directory,
            manager,
            locks,
        }
    }

    pub async fn login_by_id(
        &self,
        agent_id: i64,
        extension: &str,
        context: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self.directory.get_agent(agent_id, tenant_uuids).await?;
        self.login(&agent, extension, context).await
    }

    pub async fn login_by_number(
        &self,
        agent_number: &str,
        extension: &str,
        context: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        let agent = self
            .directory
            .get_agent_by_number(agent_number, tenant_uuids)
            .await?;
        self.login(&agent, extension, context).await
    }

    async fn login(&self, agent: &Agent, extension: &str, context: &str) -> Result<()> {
        if !self.directory.extension_exists(extension, context).await? {
            return Err(AgentServerError::NoSuchExtension);
        }
        let _guard = self.locks.hold(agent.id).await;
        self.manager.login_agent(agent, extension, context).await
    }
}
