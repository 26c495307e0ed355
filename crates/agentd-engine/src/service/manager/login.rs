//! Agent login workflow.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::agent::Agent;
use crate::ami::{AmiAction, AmiClient};
use crate::bus::{AgentEvent, EventPublisher};
use crate::database::AgentStatusStore;
use crate::error::{AgentServerError, Result};
use crate::queue_log::QueueLogManager;
use crate::service::manager::send_checked;

pub struct LoginManager {
    ami: Arc<dyn AmiClient>,
    status_store: AgentStatusStore,
    queue_log: Arc<QueueLogManager>,
    publisher: Arc<dyn EventPublisher>,
}

impl LoginManager {
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

    /// Log an agent in on the given extension/context.
    ///
    /// The telephony command must succeed before the status is persisted,
    /// and the status must be persisted before the event goes out, so
    /// subscribers never observe a login that is not yet queryable.
    pub async fn login_agent(&self, agent: &Agent, extension: &str, context: &str) -> Result<()> {
        self.check_agent_is_not_logged(agent).await?;
        self.check_extension_is_not_in_use(extension, context).await?;

        info!(
            "logging in agent {} on {}@{}",
            agent.number, extension, context
        );
        send_checked(
            &*self.ami,
            AmiAction::agent_login(&agent.number, extension, context),
        )
        .await?;

        self.status_store
            .log_in_agent(
                agent.id,
                &agent.number,
                agent.tenant_uuid,
                extension,
                context,
                Utc::now(),
            )
            .await?;

        self.queue_log
            .on_agent_logged_in(&agent.number, extension, context)
            .await?;

        self.publisher
            .publish(AgentEvent::AgentLoggedIn {
                agent_id: agent.id,
                agent_number: agent.number.clone(),
                tenant_uuid: agent.tenant_uuid,
                extension: extension.to_string(),
                context: context.to_string(),
            })
            .await
    }

    async fn check_agent_is_not_logged(&self, agent: &Agent) -> Result<()> {
        match self.status_store.get_status(agent.id, None).await? {
            Some(status) if status.logged => Err(AgentServerError::AgentAlreadyLogged),
            _ => Ok(()),
        }
    }

    async fn check_extension_is_not_in_use(&self, extension: &str, context: &str) -> Result<()> {
        if self.status_store.is_extension_in_use(extension, context).await? {
            Err(AgentServerError::ExtensionAlreadyInUse)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbManager;
    use crate::testing::{CollectingPublisher, MockAmiClient};
    use uuid::Uuid;

    struct Fixture {
        manager: LoginManager,
        db: DbManager,
        ami: Arc<MockAmiClient>,
        publisher: Arc<CollectingPublisher>,
    }

    async fn fixture() -> Fixture {
        let db = DbManager::new_in_memory().await.unwrap();
        let ami = Arc::new(MockAmiClient::new());
        let publisher = Arc::new(CollectingPublisher::new());
        let manager = LoginManager::new(
            ami.clone(),
            db.agent_status_store(),
            Arc::new(QueueLogManager::new(db.queue_log_store())),
            publisher.clone(),
        );
        Fixture {
            manager,
            db,
            ami,
            publisher,
        }
    }

    async fn make_agent(db: &DbManager, number: &str) -> Agent {
        db.agent_directory()
            .insert_agent(number, Uuid::new_v4(), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn login_updates_status_logs_and_publishes() {
        let f = fixture().await;
        let agent = make_agent(&f.db, "1001").await;

        f.manager.login_agent(&agent, "100", "default").await.unwrap();

        let status = f
            .db
            .agent_status_store()
            .get_status(agent.id, None)
            .await
            .unwrap()
            .unwrap();
        assert!(status.logged);
        assert_eq!(status.extension.as_deref(), Some("100"));
        assert_eq!(status.context.as_deref(), Some("default"));

        assert_eq!(f.ami.sent_names(), vec!["AgentCallbackLogin"]);
        assert_eq!(f.publisher.event_names(), vec!["agent_logged_in"]);

        let entries = f
            .db
            .queue_log_store()
            .entries_for_agent("Agent/1001")
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "AGENTCALLBACKLOGIN");
    }

    #[tokio::test]
    async fn already_logged_agent_is_rejected_without_side_effects() {
        let f = fixture().await;
        let agent = make_agent(&f.db, "1001").await;
        f.manager.login_agent(&agent, "100", "default").await.unwrap();

        let sent_before = f.ami.sent().len();
        let events_before = f.publisher.events().len();

        let err = f.manager.login_agent(&agent, "101", "default").await.unwrap_err();
        assert!(matches!(err, AgentServerError::AgentAlreadyLogged));
        assert_eq!(f.ami.sent().len(), sent_before);
        assert_eq!(f.publisher.events().len(), events_before);
    }

    #[tokio::test]
    async fn extension_in_use_is_rejected() {
        let f = fixture().await;
        let first = make_agent(&f.db, "1001").await;
        let second = make_agent(&f.db, "1002").await;
        f.manager.login_agent(&first, "100", "default").await.unwrap();

        let err = f.manager.login_agent(&second, "100", "default").await.unwrap_err();
        assert!(matches!(err, AgentServerError::ExtensionAlreadyInUse));

        // Same extension in a different context is fine.
        f.manager.login_agent(&second, "100", "other").await.unwrap();
    }

    #[tokio::test]
    async fn rejected_telephony_command_aborts_the_workflow() {
        let f = fixture().await;
        let agent = make_agent(&f.db, "1001").await;
        f.ami.fail_action("AgentCallbackLogin");

        let err = f.manager.login_agent(&agent, "100", "default").await.unwrap_err();
        assert!(matches!(err, AgentServerError::AmiCommandFailed(_)));

        // Status never claims a login the telephony layer refused.
        let status = f.db.agent_status_store().get_status(agent.id, None).await.unwrap();
        assert!(status.is_none());
        assert!(f.publisher.events().is_empty());
    }
}
