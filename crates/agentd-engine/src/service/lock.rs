//! Per-agent advisory locks.
//!
//! Workflows against the same agent are serialized; different agents never
//! contend. Entries are created on first use and kept for the process
//! lifetime, the agent population is small and stable.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct AgentLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl AgentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn hold(&self, agent_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(agent_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_agent_serializes_different_agents_do_not() {
        let locks = Arc::new(AgentLocks::new());

        let guard = locks.hold(1).await;
        // Another agent is free while agent 1 is held.
        let other = locks.hold(2).await;
        drop(other);

        let contended = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.hold(1).await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!contended.is_finished());

        drop(guard);
        contended.await.unwrap();
    }
}
