//! Bulk re-login of all logged agents.
//!
//! Used after the telephony server restarts and has forgotten its agent
//! channels: every logged agent is logged off and immediately logged back in
//! at the same extension and context. One broken agent never aborts the
//! sweep.

use std::sync::Arc;

use tracing::{error, info};

use crate::database::{AgentDirectory, AgentStatusStore};
use crate::error::{AgentServerError, Result};
use crate::service::manager::{LoginManager, LogoffManager};

pub struct RelogManager {
    login: Arc<LoginManager>,
    logoff: Arc<LogoffManager>,
    directory: AgentDirectory,
    status_store: AgentStatusStore,
}

impl RelogManager {
    pub fn new(
        login: Arc<LoginManager>,
        logoff: Arc<LogoffManager>,
        directory: AgentDirectory,
        status_store: AgentStatusStore,
    ) -> Self {
        Self {
            login,
            logoff,
            directory,
            status_store,
        }
    }

    pub async fn relog_all_agents(&self) -> Result<()> {
        let statuses = self.status_store.get_logged_statuses().await?;
        info!("relogging {} agents", statuses.len());
        for status in statuses {
            if let Err(err) = self.relog_agent(&status).await {
                error!("error while relogging agent {}: {}", status.agent_number, err);
            }
        }
        Ok(())
    }

    async fn relog_agent(&self, status: &crate::agent::AgentStatus) -> Result<()> {
        let extension = status
            .extension
            .clone()
            .ok_or(AgentServerError::AgentNotLogged)?;
        let context = status
            .context
            .clone()
            .ok_or(AgentServerError::AgentNotLogged)?;

        self.logoff.logoff_agent(status).await?;
        let agent = self.directory.get_agent(status.agent_id, None).await?;
        self.login.login_agent(&agent, &extension, &context).await
    }
}
