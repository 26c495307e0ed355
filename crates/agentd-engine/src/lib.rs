//! # Agent State Management Engine
//!
//! This crate orchestrates call-center agent state for a PBX: logging
//! agents in and out, pausing and unpausing them, and keeping their queue
//! memberships in sync between an HTTP API, an AMI-style telephony
//! protocol and a message bus.
//!
//! ## Architecture
//!
//! - [`service`]: workflow managers and request handlers behind the
//!   [`service::AgentService`] facade
//! - [`ami`]: typed telephony commands and the TCP client that sends them
//! - [`bus`]: outbound domain events and the inbound notification consumer
//! - [`database`]: sqlx/SQLite stores for agents, statuses, memberships
//!   and the queue log
//! - [`api`]: the axum HTTP surface
//! - [`server`]: builder that wires everything and runs the daemon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agentd_engine::config::AgentEngineConfig;
//! use agentd_engine::server::AgentServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> agentd_engine::Result<()> {
//!     let config = AgentEngineConfig::default();
//!     let server = AgentServerBuilder::new(config).build().await?;
//!     server.start();
//!     server.run().await
//! }
//! ```

// Core modules
pub mod agent;
pub mod config;
pub mod error;

// External interfaces
pub mod ami;
pub mod api;
pub mod bus;
pub mod database;

// Orchestration
pub mod queue_log;
pub mod service;
pub mod status;

// Server wiring
pub mod server;

// Test doubles for the AMI and bus seams
pub mod testing;

pub use agent::{Agent, AgentStatus, Queue};
pub use config::AgentEngineConfig;
pub use error::{AgentServerError, Result};
pub use server::{AgentServer, AgentServerBuilder};
pub use service::AgentService;

pub mod prelude {
    pub use crate::agent::{Agent, AgentQueue, AgentStatus, PauseInfo, Queue};
    pub use crate::ami::{AmiAction, AmiClient, AmiResponse, TcpAmiClient};
    pub use crate::bus::{AgentEvent, BusConsumer, BusMessage, BusPublisher, EventPublisher};
    pub use crate::config::AgentEngineConfig;
    pub use crate::database::DbManager;
    pub use crate::error::{AgentServerError, Result};
    pub use crate::server::{AgentServer, AgentServerBuilder};
    pub use crate::service::AgentService;
    pub use crate::status::{Status, StatusSummary};
}
