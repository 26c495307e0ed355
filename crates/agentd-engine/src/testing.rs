//! Test doubles for the external seams.
//!
//! Used by the unit tests and the crate-level integration tests. The mock
//! AMI client records every action it is asked to send and can be told to
//! reject specific action names, which is how telephony failures are
//! simulated.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ami::{AmiAction, AmiClient, AmiResponse};
use crate::bus::{AgentEvent, EventPublisher};
use crate::error::Result;

/// Records sent actions; succeeds unless told otherwise.
#[derive(Default)]
pub struct MockAmiClient {
    sent: Mutex<Vec<AmiAction>>,
    fail_actions: Mutex<HashSet<String>>,
    fail_rules: Mutex<Vec<(String, String, String)>>,
}

impl MockAmiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every action with this name answer `Response: Error`.
    pub fn fail_action(&self, name: &str) {
        self.fail_actions.lock().insert(name.to_string());
    }

    /// Like [`fail_action`](Self::fail_action) but only when the action
    /// carries the given header value, e.g. one agent's interface.
    pub fn fail_action_for(&self, name: &str, key: &str, value: &str) {
        self.fail_rules
            .lock()
            .push((name.to_string(), key.to_string(), value.to_string()));
    }

    pub fn sent(&self) -> Vec<AmiAction> {
        self.sent.lock().clone()
    }

    pub fn sent_names(&self) -> Vec<String> {
        self.sent.lock().iter().map(|a| a.name().to_string()).collect()
    }
}

#[async_trait]
impl AmiClient for MockAmiClient {
    async fn send(&self, action: AmiAction) -> Result<AmiResponse> {
        let failed = self.fail_actions.lock().contains(action.name())
            || self.fail_rules.lock().iter().any(|(name, key, value)| {
                name == action.name() && action.get(key) == Some(value.as_str())
            });
        self.sent.lock().push(action);
        if failed {
            Ok(AmiResponse::parse("Response: Error\r\nMessage: simulated failure\r\n").unwrap())
        } else {
            Ok(AmiResponse::parse("Response: Success\r\n").unwrap())
        }
    }
}

/// Collects published events for later inspection.
#[derive(Default)]
pub struct CollectingPublisher {
    events: Mutex<Vec<AgentEvent>>,
}

impl CollectingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.name()).collect()
    }
}

#[async_trait]
impl EventPublisher for CollectingPublisher {
    async fn publish(&self, event: AgentEvent) -> Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}
