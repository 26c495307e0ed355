//! Engine configuration.
//!
//! Follows the nested-section pattern used across the stack: one struct per
//! subsystem, each with a `Default` implementation that yields a working
//! development setup, gathered under [`AgentEngineConfig`].

use std::net::SocketAddr;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the agent engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentEngineConfig {
    /// General server settings.
    pub general: GeneralConfig,

    /// Telephony server (AMI) connection settings.
    pub ami: AmiConfig,

    /// Database settings.
    pub database: DatabaseConfig,

    /// Message bus settings.
    pub bus: BusConfig,
}

/// General server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Address the HTTP control API listens on.
    pub listen_addr: SocketAddr,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9493".parse().expect("valid default addr"),
        }
    }
}

/// AMI connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmiConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl AmiConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AmiConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5038,
            username: "agentd".to_string(),
            password: "agentd".to_string(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL. `sqlite::memory:` gives an ephemeral database.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }
}

/// Message bus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Capacity of the in-process broadcast channel.
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}
