//! Agent engine daemon.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agentd_engine::config::AgentEngineConfig;
use agentd_engine::server::AgentServerBuilder;

#[derive(Parser, Debug)]
#[command(name = "agentd", about = "Agent state management daemon")]
struct Args {
    /// HTTP listen address.
    #[arg(long)]
    listen_addr: Option<std::net::SocketAddr>,

    /// Telephony server host.
    #[arg(long)]
    ami_host: Option<String>,

    /// Telephony server port.
    #[arg(long)]
    ami_port: Option<u16>,

    /// Telephony server username.
    #[arg(long)]
    ami_username: Option<String>,

    /// Telephony server password.
    #[arg(long)]
    ami_password: Option<String>,

    /// Database URL.
    #[arg(long)]
    database_url: Option<String>,
}

impl Args {
    fn into_config(self) -> AgentEngineConfig {
        let mut config = AgentEngineConfig::default();
        if let Some(addr) = self.listen_addr {
            config.general.listen_addr = addr;
        }
        if let Some(host) = self.ami_host {
            config.ami.host = host;
        }
        if let Some(port) = self.ami_port {
            config.ami.port = port;
        }
        if let Some(username) = self.ami_username {
            config.ami.username = username;
        }
        if let Some(password) = self.ami_password {
            config.ami.password = password;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Args::parse().into_config();
    info!("starting agentd");

    let server = AgentServerBuilder::new(config)
        .build()
        .await
        .context("failed to initialize server")?;
    server.start();
    server.run().await.context("server error")?;
    Ok(())
}
