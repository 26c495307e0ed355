//! AMI client trait and TCP transport.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::ami::{AmiAction, AmiResponse};
use crate::config::AmiConfig;
use crate::error::{AgentServerError, Result};

/// Sends typed commands to the telephony server.
///
/// Each send is a blocking round-trip; the managers inspect
/// [`AmiResponse::is_success`] and abort their workflow on failure.
#[async_trait]
pub trait AmiClient: Send + Sync {
    async fn send(&self, action: AmiAction) -> Result<AmiResponse>;
}

/// AMI client over a TCP connection.
///
/// Connects lazily, authenticates with the configured credentials, and
/// reconnects on the next send after a transport error. One command is in
/// flight at a time; concurrent callers serialize on the connection lock.
pub struct TcpAmiClient {
    config: AmiConfig,
    connection: Mutex<Option<BufStream<TcpStream>>>,
    next_action_id: AtomicU64,
}

impl TcpAmiClient {
    pub fn new(config: AmiConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
            next_action_id: AtomicU64::new(1),
        }
    }

    async fn connect(&self) -> Result<BufStream<TcpStream>> {
        let address = self.config.address();
        info!("connecting to AMI on {}", address);
        let stream = TcpStream::connect(&address).await?;
        let mut stream = BufStream::new(stream);

        // The server greets with a single banner line before any block.
        let mut banner = String::new();
        stream.read_line(&mut banner).await?;
        debug!("AMI banner: {}", banner.trim_end());

        let login = AmiAction::login(&self.config.username, &self.config.password);
        let action_id = self.next_action_id.fetch_add(1, Ordering::Relaxed).to_string();
        let response = Self::round_trip(&mut stream, &login, &action_id).await?;
        if !response.is_success() {
            return Err(AgentServerError::AmiCommandFailed(format!(
                "AMI authentication failed: {}",
                response.message()
            )));
        }
        info!("AMI connection authenticated");
        Ok(stream)
    }

    async fn round_trip(
        stream: &mut BufStream<TcpStream>,
        action: &AmiAction,
        action_id: &str,
    ) -> Result<AmiResponse> {
        stream.write_all(action.to_wire(action_id).as_bytes()).await?;
        stream.flush().await?;

        // Event blocks may be interleaved before our response arrives.
        loop {
            let block = Self::read_block(stream).await?;
            match AmiResponse::parse(&block) {
                Some(response)
                    if response.action_id().is_none() || response.action_id() == Some(action_id) =>
                {
                    return Ok(response);
                }
                Some(other) => {
                    debug!("skipping response for action {:?}", other.action_id());
                }
                None => {
                    debug!("skipping event block while waiting for response");
                }
            }
        }
    }

    async fn read_block(stream: &mut BufStream<TcpStream>) -> Result<String> {
        let mut block = String::new();
        loop {
            let mut line = String::new();
            let read = stream.read_line(&mut line).await?;
            if read == 0 {
                return Err(AgentServerError::AmiTransport(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "AMI connection closed",
                )));
            }
            if line.trim_end_matches(['\r', '\n']).is_empty() {
                return Ok(block);
            }
            block.push_str(&line);
        }
    }
}

#[async_trait]
impl AmiClient for TcpAmiClient {
    async fn send(&self, action: AmiAction) -> Result<AmiResponse> {
        let mut guard = self.connection.lock().await;
        if guard.is_none() {
            *guard = Some(self.connect().await?);
        }
        let stream = guard.as_mut().expect("connection just established");

        let action_id = self.next_action_id.fetch_add(1, Ordering::Relaxed).to_string();
        debug!("sending AMI action {} (id {})", action.name(), action_id);
        match Self::round_trip(stream, &action, &action_id).await {
            Ok(response) => Ok(response),
            Err(e) => {
                // Drop the connection so the next send reconnects.
                warn!("AMI round-trip failed, resetting connection: {}", e);
                *guard = None;
                Err(e)
            }
        }
    }
}
