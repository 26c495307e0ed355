//! Queue membership store.

use sqlx::SqlitePool;

use crate::error::Result;

#[derive(Clone)]
pub struct QueueMemberStore {
    pool: SqlitePool,
}

impl QueueMemberStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add_agent_to_queue(
        &self,
        agent_id: i64,
        agent_number: &str,
        queue_id: i64,
        queue_name: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO queue_members (agent_id, agent_number, queue_id, queue_name, penalty) VALUES (?, ?, ?, ?, 0)",
        )
        .bind(agent_id)
        .bind(agent_number)
        .bind(queue_id)
        .bind(queue_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_agent_from_queue(&self, agent_id: i64, queue_name: &str) -> Result<()> {
        sqlx::query("DELETE FROM queue_members WHERE agent_id = ? AND queue_name = ?")
            .bind(agent_id)
            .bind(queue_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn member_count(&self, agent_id: i64, queue_name: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM queue_members WHERE agent_id = ? AND queue_name = ?",
        )
        .bind(agent_id)
        .bind(queue_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }
}
