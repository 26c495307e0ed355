//! Engine server: wires the database, the AMI client, the bus and the
//! HTTP surface, and owns the bus dispatch loop.

use std::sync::Arc;

use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::ami::{AmiClient, TcpAmiClient};
use crate::api::{create_router, ApiState};
use crate::bus::{BusConsumer, BusMessage, BusPublisher};
use crate::config::AgentEngineConfig;
use crate::database::DbManager;
use crate::error::Result;
use crate::service::handler::QueueMemberPauseEvent;
use crate::service::AgentService;
use crate::status::{HealthReporter, StatusSummary};

/// Routing key of inbound telephony pause notifications.
const QUEUE_MEMBER_PAUSE_KEY: &str = "ami.QueueMemberPause";

pub struct AgentServerBuilder {
    config: AgentEngineConfig,
    ami: Option<Arc<dyn AmiClient>>,
}

impl AgentServerBuilder {
    pub fn new(config: AgentEngineConfig) -> Self {
        Self { config, ami: None }
    }

    /// Replace the TCP AMI client, used by tests.
    pub fn with_ami_client(mut self, ami: Arc<dyn AmiClient>) -> Self {
        self.ami = Some(ami);
        self
    }

    pub async fn build(self) -> Result<AgentServer> {
        let db = DbManager::new(&self.config.database.url).await?;
        let (bus_tx, _) = broadcast::channel(self.config.bus.channel_capacity);
        let publisher = Arc::new(BusPublisher::new(bus_tx.clone()));
        let ami = self
            .ami
            .unwrap_or_else(|| Arc::new(TcpAmiClient::new(self.config.ami.clone())));

        let service = Arc::new(AgentService::new(&db, ami, publisher));
        let consumer = BusConsumer::new(bus_tx.clone());
        let health = Arc::new(HealthReporter::new(consumer.clone()));

        Ok(AgentServer {
            config: self.config,
            db,
            service,
            consumer,
            health,
            bus_tx,
            dispatch: Mutex::new(None),
        })
    }
}

pub struct AgentServer {
    config: AgentEngineConfig,
    db: DbManager,
    service: Arc<AgentService>,
    consumer: BusConsumer,
    health: Arc<HealthReporter>,
    bus_tx: broadcast::Sender<BusMessage>,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl AgentServer {
    pub fn service(&self) -> Arc<AgentService> {
        self.service.clone()
    }

    pub fn database(&self) -> DbManager {
        self.db.clone()
    }

    pub fn health(&self) -> StatusSummary {
        self.health.summary()
    }

    /// Sender side of the bus, used to inject inbound messages.
    pub fn bus_sender(&self) -> broadcast::Sender<BusMessage> {
        self.bus_tx.clone()
    }

    pub fn router(&self) -> Router {
        create_router(ApiState {
            service: self.service.clone(),
            health: self.health.clone(),
        })
    }

    /// Start the bus dispatch loop.
    pub fn start(&self) {
        let mut rx = self.consumer.subscribe();
        let consumer = self.consumer.clone();
        let service = self.service.clone();

        consumer.set_connected(true);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) => {
                        if let Err(err) = dispatch_message(&service, &message).await {
                            error!(
                                "error while handling bus message {}: {}",
                                message.routing_key, err
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("bus consumer lagged, {} messages dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        consumer.set_connected(false);
                        break;
                    }
                }
            }
        });
        *self.dispatch.lock() = Some(handle);
    }

    /// Serve the HTTP API until a shutdown signal arrives.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.general.listen_addr).await?;
        info!("listening on {}", self.config.general.listen_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("shutting down");
        self.stop();
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(handle) = self.dispatch.lock().take() {
            handle.abort();
        }
        self.consumer.set_connected(false);
    }
}

async fn dispatch_message(service: &AgentService, message: &BusMessage) -> Result<()> {
    match message.routing_key.as_str() {
        QUEUE_MEMBER_PAUSE_KEY => {
            let event: QueueMemberPauseEvent =
                serde_json::from_value(message.payload.clone()).map_err(|err| {
                    crate::error::AgentServerError::Bus(format!(
                        "malformed pause notification: {err}"
                    ))
                })?;
            service.on_queue_member_pause(&event).await
        }
        "config.queue.created" => service.on_queue_added(queue_id(message)?).await,
        "config.queue.edited" => service.on_queue_updated(queue_id(message)?).await,
        "config.queue.deleted" => service.on_queue_deleted(queue_id(message)?).await,
        _ => Ok(()),
    }
}

fn queue_id(message: &BusMessage) -> Result<i64> {
    message.payload["id"].as_i64().ok_or_else(|| {
        crate::error::AgentServerError::Bus(format!(
            "queue notification without id: {}",
            message.routing_key
        ))
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => error!("failed to install SIGTERM handler: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
