//! Agent pause/unpause workflow.
//!
//! Two entry directions share the same postconditions: API calls go through
//! [`PauseManager::pause_agent`] / [`PauseManager::unpause_agent`] and issue
//! the telephony command, while inbound telephony notifications go through
//! [`PauseManager::on_agent_paused`] / [`PauseManager::on_agent_unpaused`],
//! which only apply store/log/publish (echoing the command back would
//! ping-pong with the PBX).

use std::sync::Arc;

use tracing::info;

use crate::agent::{AgentStatus, PauseInfo};
use crate::ami::{AmiAction, AmiClient};
use crate::bus::{AgentEvent, EventPublisher};
use crate::database::AgentStatusStore;
use crate::error::{AgentServerError, Result};
use crate::queue_log::QueueLogManager;
use crate::service::manager::send_checked;

pub struct PauseManager {
    ami: Arc<dyn AmiClient>,
    status_store: AgentStatusStore,
    queue_log: Arc<QueueLogManager>,
    publisher: Arc<dyn EventPublisher>,
}

impl PauseManager {
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

    pub async fn pause_agent(&self, status: &AgentStatus, reason: Option<&str>) -> Result<()> {
        if !status.logged {
            return Err(AgentServerError::AgentNotLogged);
        }

        info!("pausing agent {}", status.agent_number);
        send_checked(
            &*self.ami,
            AmiAction::queue_pause(&status.interface(), true, None, reason),
        )
        .await?;

        self.apply_pause(status.agent_id, &status.agent_number, true, None, reason)
            .await
    }

    /// Unpausing an agent that is not paused still sends the command and
    /// still updates/logs/publishes; the telephony layer treats the
    /// redundant command as a no-op.
    pub async fn unpause_agent(&self, status: &AgentStatus) -> Result<()> {
        info!("unpausing agent {}", status.agent_number);
        send_checked(
            &*self.ami,
            AmiAction::queue_pause(&status.interface(), false, None, None),
        )
        .await?;

        self.apply_pause(status.agent_id, &status.agent_number, false, None, None)
            .await
    }

    /// Pause notification originating from the telephony server.
    pub async fn on_agent_paused(&self, info: &PauseInfo) -> Result<()> {
        self.apply_pause(
            info.agent_id,
            &info.agent_number,
            true,
            Some(&info.queue),
            info.reason.as_deref(),
        )
        .await
    }

    /// Unpause notification originating from the telephony server.
    pub async fn on_agent_unpaused(&self, info: &PauseInfo) -> Result<()> {
        self.apply_pause(
            info.agent_id,
            &info.agent_number,
            false,
            Some(&info.queue),
            info.reason.as_deref(),
        )
        .await
    }

    async fn apply_pause(
        &self,
        agent_id: i64,
        agent_number: &str,
        paused: bool,
        queue: Option<&str>,
        reason: Option<&str>,
    ) -> Result<()> {
        self.status_store
            .update_pause(agent_id, paused, if paused { reason } else { None })
            .await?;

        if paused {
            self.queue_log.on_agent_paused(agent_number, queue, reason).await?;
        } else {
            self.queue_log.on_agent_unpaused(agent_number, queue).await?;
        }

        let event = if paused {
            AgentEvent::AgentPaused {
                agent_id,
                agent_number: agent_number.to_string(),
                reason: reason.map(str::to_string),
                queue: queue.map(str::to_string),
            }
        } else {
            AgentEvent::AgentUnpaused {
                agent_id,
                agent_number: agent_number.to_string(),
                reason: reason.map(str::to_string),
                queue: queue.map(str::to_string),
            }
        };
        self.publisher.publish(event).await
    }
}
