//! Orchestration core: managers own the workflows, handlers own the
//! dispatch, [`AgentService`] wires both over one lock map.

pub mod handler;
pub mod lock;
pub mod manager;

use std::sync::Arc;

use uuid::Uuid;

use crate::agent::AgentStatus;
use crate::ami::AmiClient;
use crate::bus::EventPublisher;
use crate::database::DbManager;
use crate::error::Result;
use crate::queue_log::QueueLogManager;
use handler::{
    LoginHandler, LogoffHandler, MembershipHandler, OnQueueHandler, PauseHandler,
    QueueMemberPauseEvent, StatusHandler,
};
use lock::AgentLocks;
use manager::{
    AddMemberManager, LoginManager, LogoffManager, PauseManager, RelogManager,
    RemoveMemberManager,
};

/// Facade over every agent workflow. One instance per process, shared by
/// the HTTP layer and the bus dispatch loop.
pub struct AgentService {
    login: LoginHandler,
    logoff: LogoffHandler,
    pause: PauseHandler,
    membership: MembershipHandler,
    status: StatusHandler,
    on_queue: OnQueueHandler,
}

impl AgentService {
    pub fn new(
        db: &DbManager,
        ami: Arc<dyn AmiClient>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let directory = db.agent_directory();
        let status_store = db.agent_status_store();
        let queue_log = Arc::new(QueueLogManager::new(db.queue_log_store()));
        let locks = Arc::new(AgentLocks::new());

        let login_manager = Arc::new(LoginManager::new(
            ami.clone(),
            status_store.clone(),
            queue_log.clone(),
            publisher.clone(),
        ));
        let logoff_manager = Arc::new(LogoffManager::new(
            ami.clone(),
            status_store.clone(),
            queue_log.clone(),
            publisher.clone(),
        ));
        let pause_manager = Arc::new(PauseManager::new(
            ami.clone(),
            status_store.clone(),
            queue_log,
            publisher.clone(),
        ));
        let add_manager = Arc::new(AddMemberManager::new(
            ami.clone(),
            status_store.clone(),
            db.queue_member_store(),
            publisher.clone(),
        ));
        let remove_manager = Arc::new(RemoveMemberManager::new(
            ami,
            status_store.clone(),
            db.queue_member_store(),
            publisher.clone(),
        ));
        let relog_manager = Arc::new(RelogManager::new(
            login_manager.clone(),
            logoff_manager.clone(),
            directory.clone(),
            status_store.clone(),
        ));

        Self {
            login: LoginHandler::new(directory.clone(), login_manager, locks.clone()),
            logoff: LogoffHandler::new(
                directory.clone(),
                status_store.clone(),
                logoff_manager,
                relog_manager,
                locks.clone(),
            ),
            pause: PauseHandler::new(
                directory.clone(),
                status_store.clone(),
                pause_manager.clone(),
                locks.clone(),
            ),
            membership: MembershipHandler::new(
                directory.clone(),
                add_manager,
                remove_manager,
                locks,
            ),
            status: StatusHandler::new(directory, status_store.clone()),
            on_queue: OnQueueHandler::new(status_store, pause_manager, publisher),
        }
    }

    pub async fn login_by_id(
        &self,
        agent_id: i64,
        extension: &str,
        context: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.login
            .login_by_id(agent_id, extension, context, tenant_uuids)
            .await
    }

    pub async fn login_by_number(
        &self,
        agent_number: &str,
        extension: &str,
        context: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.login
            .login_by_number(agent_number, extension, context, tenant_uuids)
            .await
    }

    pub async fn logoff_by_id(&self, agent_id: i64, tenant_uuids: Option<&[Uuid]>) -> Result<()> {
        self.logoff.logoff_by_id(agent_id, tenant_uuids).await
    }

    pub async fn logoff_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.logoff.logoff_by_number(agent_number, tenant_uuids).await
    }

    pub async fn logoff_all(&self) -> Result<()> {
        self.logoff.logoff_all().await
    }

    pub async fn relog_all(&self) -> Result<()> {
        self.logoff.relog_all().await
    }

    pub async fn pause_by_id(
        &self,
        agent_id: i64,
        reason: Option<&str>,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.pause.pause_by_id(agent_id, reason, tenant_uuids).await
    }

    pub async fn pause_by_number(
        &self,
        agent_number: &str,
        reason: Option<&str>,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.pause
            .pause_by_number(agent_number, reason, tenant_uuids)
            .await
    }

    pub async fn unpause_by_id(&self, agent_id: i64, tenant_uuids: Option<&[Uuid]>) -> Result<()> {
        self.pause.unpause_by_id(agent_id, tenant_uuids).await
    }

    pub async fn unpause_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.pause.unpause_by_number(agent_number, tenant_uuids).await
    }

    pub async fn add_agent_to_queue(
        &self,
        agent_id: i64,
        queue_id: i64,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.membership
            .add_agent_to_queue(agent_id, queue_id, tenant_uuids)
            .await
    }

    pub async fn remove_agent_from_queue(
        &self,
        agent_id: i64,
        queue_id: i64,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<()> {
        self.membership
            .remove_agent_from_queue(agent_id, queue_id, tenant_uuids)
            .await
    }

    pub async fn status_by_id(
        &self,
        agent_id: i64,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<AgentStatus> {
        self.status.get_by_id(agent_id, tenant_uuids).await
    }

    pub async fn status_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<AgentStatus> {
        self.status.get_by_number(agent_number, tenant_uuids).await
    }

    pub async fn list_statuses(&self, tenant_uuids: Option<&[Uuid]>) -> Result<Vec<AgentStatus>> {
        self.status.list(tenant_uuids).await
    }

    pub async fn on_queue_member_pause(&self, event: &QueueMemberPauseEvent) -> Result<()> {
        self.on_queue.on_queue_member_pause(event).await
    }

    pub async fn on_queue_added(&self, queue_id: i64) -> Result<()> {
        self.on_queue.on_queue_added(queue_id).await
    }

    pub async fn on_queue_updated(&self, queue_id: i64) -> Result<()> {
        self.on_queue.on_queue_updated(queue_id).await
    }

    pub async fn on_queue_deleted(&self, queue_id: i64) -> Result<()> {
        self.on_queue.on_queue_deleted(queue_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio::sync::{Notify, Semaphore};

    use crate::agent::Agent;
    use crate::ami::{AmiAction, AmiResponse};
    use crate::error::AgentServerError;
    use crate::testing::{CollectingPublisher, MockAmiClient};

    /// AMI client that parks sends of one action name until released,
    /// so a test can hold a workflow mid-flight.
    struct GatedAmiClient {
        inner: MockAmiClient,
        gated_action: &'static str,
        entered: Notify,
        release: Semaphore,
    }

    impl GatedAmiClient {
        fn new(gated_action: &'static str) -> Self {
            Self {
                inner: MockAmiClient::new(),
                gated_action,
                entered: Notify::new(),
                release: Semaphore::new(0),
            }
        }
    }

    #[async_trait]
    impl AmiClient for GatedAmiClient {
        async fn send(&self, action: AmiAction) -> Result<AmiResponse> {
            if action.name() == self.gated_action {
                self.entered.notify_one();
                self.release.acquire().await.unwrap().forget();
            }
            self.inner.send(action).await
        }
    }

    struct Fixture {
        ami: Arc<GatedAmiClient>,
        publisher: Arc<CollectingPublisher>,
        service: Arc<AgentService>,
        agent: Agent,
    }

    async fn logged_in_fixture(gated_action: &'static str) -> Fixture {
        let db = DbManager::new_in_memory().await.unwrap();
        let ami = Arc::new(GatedAmiClient::new(gated_action));
        let publisher = Arc::new(CollectingPublisher::new());
        let service = Arc::new(AgentService::new(&db, ami.clone(), publisher.clone()));

        let directory = db.agent_directory();
        let agent = directory
            .insert_agent("1001", Uuid::new_v4(), None)
            .await
            .unwrap();
        directory.insert_extension("100", "default").await.unwrap();
        service
            .login_by_id(agent.id, "100", "default", None)
            .await
            .unwrap();

        Fixture {
            ami,
            publisher,
            service,
            agent,
        }
    }

    #[tokio::test]
    async fn concurrent_logoffs_run_the_workflow_once() {
        let f = logged_in_fixture("AgentLogoff").await;
        let agent_id = f.agent.id;

        let first = tokio::spawn({
            let service = f.service.clone();
            async move { service.logoff_by_id(agent_id, None).await }
        });
        f.ami.entered.notified().await;

        // The first logoff is parked inside the telephony command while
        // holding the agent's lock.
        let second = tokio::spawn({
            let service = f.service.clone();
            async move { service.logoff_by_id(agent_id, None).await }
        });
        tokio::task::yield_now().await;
        assert!(!second.is_finished());

        f.ami.release.add_permits(1);
        first.await.unwrap().unwrap();
        assert!(matches!(
            second.await.unwrap(),
            Err(AgentServerError::AgentNotLogged)
        ));

        let names = f.ami.inner.sent_names();
        assert_eq!(names.iter().filter(|n| *n == "AgentLogoff").count(), 1);
        let events = f.publisher.event_names();
        assert_eq!(events.iter().filter(|n| **n == "agent_logged_off").count(), 1);
    }

    #[tokio::test]
    async fn pause_racing_a_logoff_is_rejected() {
        let f = logged_in_fixture("AgentLogoff").await;
        let agent_id = f.agent.id;

        let logoff = tokio::spawn({
            let service = f.service.clone();
            async move { service.logoff_by_id(agent_id, None).await }
        });
        f.ami.entered.notified().await;

        let pause = tokio::spawn({
            let service = f.service.clone();
            async move { service.pause_by_id(agent_id, Some("Break"), None).await }
        });

        f.ami.release.add_permits(1);
        logoff.await.unwrap().unwrap();
        assert!(matches!(
            pause.await.unwrap(),
            Err(AgentServerError::AgentNotLogged)
        ));

        let names = f.ami.inner.sent_names();
        assert!(!names.iter().any(|n| n == "QueuePause"));
        assert!(!f.publisher.event_names().contains(&"agent_paused"));
    }
}
