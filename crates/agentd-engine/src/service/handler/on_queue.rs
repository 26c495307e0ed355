//! Inbound telephony notifications delivered over the bus.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::agent::PauseInfo;
use crate::bus::{AgentEvent, EventPublisher};
use crate::database::AgentStatusStore;
use crate::error::{AgentServerError, Result};
use crate::service::manager::PauseManager;

/// `QueueMemberPause` notification fields as the telephony server emits
/// them.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueMemberPauseEvent {
    #[serde(rename = "MemberName")]
    pub member_name: String,
    #[serde(rename = "Queue")]
    pub queue: String,
    #[serde(rename = "Paused")]
    pub paused: String,
    #[serde(rename = "PausedReason", default)]
    pub paused_reason: Option<String>,
}

impl QueueMemberPauseEvent {
    pub fn is_paused(&self) -> bool {
        matches!(self.paused.as_str(), "1" | "true")
    }

    /// `MemberName` has the shape `Agent/<number>`.
    fn agent_number(&self) -> Result<&str> {
        self.member_name
            .split('/')
            .nth(1)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AgentServerError::Internal(format!(
                    "unparseable member name: {}",
                    self.member_name
                ))
            })
    }
}

pub struct OnQueueHandler {
    status_store: AgentStatusStore,
    pause: Arc<PauseManager>,
    publisher: Arc<dyn EventPublisher>,
}

impl OnQueueHandler {
    pub fn new(
        status_store: AgentStatusStore,
        pause: Arc<PauseManager>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            status_store,
            pause,
            publisher,
        }
    }

    pub async fn on_queue_member_pause(&self, event: &QueueMemberPauseEvent) -> Result<()> {
        debug!("queue member pause notification: {:?}", event);
        let agent_number = event.agent_number()?;
        let status = self
            .status_store
            .get_status_by_number(agent_number, None)
            .await?
            .ok_or(AgentServerError::NoSuchAgent)?;
        // A late notification can arrive after the agent logged off; a
        // logged-out agent is never paused.
        if !status.logged {
            return Err(AgentServerError::AgentNotLogged);
        }

        let info = PauseInfo {
            agent_id: status.agent_id,
            agent_number: status.agent_number.clone(),
            reason: event.paused_reason.clone().filter(|r| !r.is_empty()),
            queue: event.queue.clone(),
        };
        if event.is_paused() {
            self.pause.on_agent_paused(&info).await
        } else {
            self.pause.on_agent_unpaused(&info).await
        }
    }

    pub async fn on_queue_added(&self, queue_id: i64) -> Result<()> {
        self.publisher.publish(AgentEvent::QueueAdded { queue_id }).await
    }

    pub async fn on_queue_updated(&self, queue_id: i64) -> Result<()> {
        self.publisher.publish(AgentEvent::QueueUpdated { queue_id }).await
    }

    pub async fn on_queue_deleted(&self, queue_id: i64) -> Result<()> {
        self.publisher.publish(AgentEvent::QueueDeleted { queue_id }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbManager;
    use crate::queue_log::QueueLogManager;
    use crate::testing::{CollectingPublisher, MockAmiClient};
    use chrono::Utc;
    use uuid::Uuid;

    fn event(member_name: &str, paused: &str) -> QueueMemberPauseEvent {
        QueueMemberPauseEvent {
            member_name: member_name.to_string(),
            queue: "support".to_string(),
            paused: paused.to_string(),
            paused_reason: Some("Break".to_string()),
        }
    }

    #[test]
    fn member_name_parsing() {
        assert_eq!(event("Agent/1001", "1").agent_number().unwrap(), "1001");
        assert!(event("bogus", "1").agent_number().is_err());
        assert!(event("Agent/", "1").agent_number().is_err());
    }

    #[test]
    fn paused_flag_parsing() {
        assert!(event("Agent/1001", "1").is_paused());
        assert!(event("Agent/1001", "true").is_paused());
        assert!(!event("Agent/1001", "0").is_paused());
    }

    #[tokio::test]
    async fn notification_for_logged_out_agent_is_rejected() {
        let db = DbManager::new_in_memory().await.unwrap();
        let ami = std::sync::Arc::new(MockAmiClient::new());
        let publisher = std::sync::Arc::new(CollectingPublisher::new());
        let pause = std::sync::Arc::new(PauseManager::new(
            ami.clone(),
            db.agent_status_store(),
            std::sync::Arc::new(QueueLogManager::new(db.queue_log_store())),
            publisher.clone(),
        ));
        let handler = OnQueueHandler::new(db.agent_status_store(), pause, publisher.clone());

        let store = db.agent_status_store();
        store
            .log_in_agent(1, "1001", Uuid::new_v4(), "100", "default", Utc::now())
            .await
            .unwrap();
        store.log_off_agent(1).await.unwrap();

        let err = handler
            .on_queue_member_pause(&event("Agent/1001", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentServerError::AgentNotLogged));

        let status = store.get_status(1, None).await.unwrap().unwrap();
        assert!(!status.logged);
        assert!(!status.paused, "logged out implies not paused");
        assert!(publisher.events().is_empty());
        assert!(ami.sent().is_empty());
    }

    #[test]
    fn deserializes_from_telephony_payload() {
        let payload = serde_json::json!({
            "MemberName": "Agent/1001",
            "Queue": "support",
            "Paused": "1",
            "PausedReason": "Break"
        });
        let event: QueueMemberPauseEvent = serde_json::from_value(payload).unwrap();
        assert_eq!(event.member_name, "Agent/1001");
        assert!(event.is_paused());
        assert_eq!(event.paused_reason.as_deref(), Some("Break"));
    }
}
