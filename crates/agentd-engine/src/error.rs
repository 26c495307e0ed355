//! Error types for agent state management operations.
//!
//! All engine operations surface an [`AgentServerError`]. Precondition
//! violations (conflicts, unknown entities) are raised before any side
//! effect is performed, so a caller that receives one of them can assume
//! nothing was sent to the telephony server and nothing was persisted.

use thiserror::Error;

/// Errors produced by the agent engine.
#[derive(Error, Debug)]
pub enum AgentServerError {
    /// No agent exists with the requested id or number.
    #[error("agent not found")]
    NoSuchAgent,

    /// The requested extension does not exist in the dialplan context.
    #[error("extension not found")]
    NoSuchExtension,

    /// No queue exists with the requested id or name.
    #[error("queue not found")]
    NoSuchQueue,

    /// The agent is already logged in.
    #[error("agent already logged")]
    AgentAlreadyLogged,

    /// The operation requires a logged-in agent.
    #[error("agent not logged")]
    AgentNotLogged,

    /// The agent is already a member of the queue.
    #[error("agent already in queue")]
    AgentAlreadyInQueue,

    /// The agent is not a member of the queue.
    #[error("agent not in queue")]
    AgentNotInQueue,

    /// Another logged-in agent already uses the extension/context pair.
    #[error("extension already in use")]
    ExtensionAlreadyInUse,

    /// The telephony server rejected a command mid-workflow. Steps after
    /// the command are not executed; the command is not retried.
    #[error("AMI command failed: {0}")]
    AmiCommandFailed(String),

    /// The AMI connection itself is unusable.
    #[error("AMI transport error: {0}")]
    AmiTransport(#[from] std::io::Error),

    /// The authentication server could not be reached.
    #[error("could not connect to authentication server: {0}")]
    AuthServerUnreachable(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Event could not be handed to the bus.
    #[error("bus error: {0}")]
    Bus(String),

    /// Catch-all for internal failures; maps to HTTP 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentServerError {
    /// True for the not-found family (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoSuchAgent | Self::NoSuchExtension | Self::NoSuchQueue
        )
    }

    /// True for the conflict family (HTTP 409).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AgentAlreadyLogged
                | Self::AgentNotLogged
                | Self::AgentAlreadyInQueue
                | Self::AgentNotInQueue
                | Self::ExtensionAlreadyInUse
        )
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, AgentServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family() {
        assert!(AgentServerError::NoSuchAgent.is_not_found());
        assert!(AgentServerError::NoSuchQueue.is_not_found());
        assert!(!AgentServerError::AgentAlreadyLogged.is_not_found());
    }

    #[test]
    fn conflict_family() {
        assert!(AgentServerError::AgentAlreadyLogged.is_conflict());
        assert!(AgentServerError::ExtensionAlreadyInUse.is_conflict());
        assert!(!AgentServerError::NoSuchAgent.is_conflict());
        assert!(!AgentServerError::AmiCommandFailed("busy".into()).is_conflict());
    }
}
