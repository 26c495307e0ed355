//! Agent logoff workflow.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::agent::AgentStatus;
use crate::ami::{AmiAction, AmiClient};
use crate::bus::{AgentEvent, EventPublisher};
use crate::database::AgentStatusStore;
use crate::error::{AgentServerError, Result};
use crate::queue_log::QueueLogManager;
use crate::service::manager::send_checked;

pub struct LogoffManager {
    ami: Arc<dyn AmiClient>,
    status_store: AgentStatusStore,
    queue_log: Arc<QueueLogManager>,
    publisher: Arc<dyn EventPublisher>,
}

impl LogoffManager {
    pub fn new(
        ami: Arc<dyn AmiClient>,
        status_store: AgentStatusStore,
        queue_log: Arc<QueueLogManager>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            ami,
            status_store,
            queue_log,
            publisher,
        }
    }

    pub async fn logoff_agent(&self, status: &AgentStatus) -> Result<()> {
        if !status.logged {
            return Err(AgentServerError::AgentNotLogged);
        }

        let logged_time = status.logged_seconds(Utc::now());
        info!(
            "logging off agent {} after {}s",
            status.agent_number, logged_time
        );
        send_checked(
            &*self.ami,
            AmiAction::agent_logoff(&status.agent_number, logged_time),
        )
        .await?;

        self.status_store.log_off_agent(status.agent_id).await?;

        self.queue_log
            .on_agent_logged_off(
                &status.agent_number,
                status.extension.as_deref().unwrap_or(""),
                status.context.as_deref().unwrap_or(""),
                logged_time as f64,
            )
            .await?;

        self.publisher
            .publish(AgentEvent::AgentLoggedOff {
                agent_id: status.agent_id,
                agent_number: status.agent_number.clone(),
                tenant_uuid: status.tenant_uuid,
            })
            .await
    }

    /// Log off every currently logged-in agent. One agent's failure is
    /// reported and does not abort processing of the rest.
    pub async fn logoff_all_agents(&self) -> Result<()> {
        for status in self.status_store.get_logged_statuses().await? {
            if let Err(e) = self.logoff_agent(&status).await {
                error!("could not log off agent {}: {}", status.agent_number, e);
            }
        }
        Ok(())
    }
}
