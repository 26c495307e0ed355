//! Queue log recording.
//!
//! Formats agent state transitions into the legacy queue-log layout and
//! appends them through the [`QueueLogStore`]. The first two columns are
//! unused for agent events and always carry the `"NONE"` placeholder.

use chrono::{DateTime, Utc};

use crate::agent::agent_interface;
use crate::database::QueueLogStore;
use crate::error::Result;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub struct QueueLogManager {
    store: QueueLogStore,
}

impl QueueLogManager {
    pub fn new(store: QueueLogStore) -> Self {
        Self { store }
    }

    pub fn format_time(time: DateTime<Utc>) -> String {
        time.format(TIME_FORMAT).to_string()
    }

    pub fn format_time_now() -> String {
        Self::format_time(Utc::now())
    }

    pub async fn on_agent_logged_in(
        &self,
        agent_number: &str,
        extension: &str,
        context: &str,
    ) -> Result<()> {
        self.store
            .insert_entry(
                &Self::format_time_now(),
                "NONE",
                "NONE",
                &agent_interface(agent_number),
                "AGENTCALLBACKLOGIN",
                Some(&format!("{extension}@{context}")),
                None,
                None,
            )
            .await
    }

    /// `logged_time` is truncated to whole seconds before being written.
    pub async fn on_agent_logged_off(
        &self,
        agent_number: &str,
        extension: &str,
        context: &str,
        logged_time: f64,
    ) -> Result<()> {
        let logged_time = format!("{}", logged_time as i64);
        self.store
            .insert_entry(
                &Self::format_time_now(),
                "NONE",
                "NONE",
                &agent_interface(agent_number),
                "AGENTCALLBACKLOGOFF",
                Some(&format!("{extension}@{context}")),
                Some(&logged_time),
                Some("CommandLogoff"),
            )
            .await
    }

    pub async fn on_agent_paused(
        &self,
        agent_number: &str,
        queue: Option<&str>,
        reason: Option<&str>,
    ) -> Result<()> {
        self.store
            .insert_entry(
                &Self::format_time_now(),
                "NONE",
                queue.unwrap_or("NONE"),
                &agent_interface(agent_number),
                "PAUSEALL",
                reason,
                None,
                None,
            )
            .await
    }

    pub async fn on_agent_unpaused(&self, agent_number: &str, queue: Option<&str>) -> Result<()> {
        self.store
            .insert_entry(
                &Self::format_time_now(),
                "NONE",
                queue.unwrap_or("NONE"),
                &agent_interface(agent_number),
                "UNPAUSEALL",
                None,
                None,
                None,
            )
            .await
    }
}
