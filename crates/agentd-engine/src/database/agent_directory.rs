//! Read access to the agent and queue directory.
//!
//! The directory itself is owned by the provisioning side of the platform;
//! the orchestration core only resolves identifiers through it. The insert
//! helpers exist for provisioning and tests.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::agent::{Agent, AgentQueue, Queue};
use crate::error::{AgentServerError, Result};

#[derive(Clone)]
pub struct AgentDirectory {
    pool: SqlitePool,
}

impl AgentDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_agent(&self, agent_id: i64, tenant_uuids: Option<&[Uuid]>) -> Result<Agent> {
        let row = sqlx::query("SELECT id, number, tenant_uuid, preprocess_subroutine FROM agents WHERE id = ?")
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await?;
        self.agent_from_row(row, tenant_uuids).await
    }

    pub async fn get_agent_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<Agent> {
        let row = sqlx::query(
            "SELECT id, number, tenant_uuid, preprocess_subroutine FROM agents WHERE number = ?",
        )
        .bind(agent_number)
        .fetch_optional(&self.pool)
        .await?;
        self.agent_from_row(row, tenant_uuids).await
    }

    pub async fn list_agents(&self, tenant_uuids: Option<&[Uuid]>) -> Result<Vec<Agent>> {
        let rows =
            sqlx::query("SELECT id, number, tenant_uuid, preprocess_subroutine FROM agents ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let mut agents = Vec::with_capacity(rows.len());
        for row in rows {
            match self.agent_from_row(Some(row), tenant_uuids).await {
                Ok(agent) => agents.push(agent),
                Err(AgentServerError::NoSuchAgent) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(agents)
    }

    pub async fn get_queue(&self, queue_id: i64) -> Result<Queue> {
        let row = sqlx::query("SELECT id, name, tenant_uuid FROM queues WHERE id = ?")
            .bind(queue_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AgentServerError::NoSuchQueue)?;
        queue_from_row(&row)
    }

    /// Checks whether a dialplan extension exists in the given context.
    pub async fn extension_exists(&self, exten: &str, context: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM extensions WHERE exten = ? AND context = ?")
            .bind(exten)
            .bind(context)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Provisioning/test helper.
    pub async fn insert_agent(
        &self,
        number: &str,
        tenant_uuid: Uuid,
        preprocess_subroutine: Option<&str>,
    ) -> Result<Agent> {
        let result = sqlx::query(
            "INSERT INTO agents (number, tenant_uuid, preprocess_subroutine) VALUES (?, ?, ?)",
        )
        .bind(number)
        .bind(tenant_uuid.to_string())
        .bind(preprocess_subroutine)
        .execute(&self.pool)
        .await?;
        self.get_agent(result.last_insert_rowid(), None).await
    }

    /// Provisioning/test helper.
    pub async fn insert_extension(&self, exten: &str, context: &str) -> Result<()> {
        sqlx::query("INSERT INTO extensions (exten, context) VALUES (?, ?)")
            .bind(exten)
            .bind(context)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Provisioning/test helper.
    pub async fn insert_queue(&self, name: &str, tenant_uuid: Uuid) -> Result<Queue> {
        let result = sqlx::query("INSERT INTO queues (name, tenant_uuid) VALUES (?, ?)")
            .bind(name)
            .bind(tenant_uuid.to_string())
            .execute(&self.pool)
            .await?;
        self.get_queue(result.last_insert_rowid()).await
    }

    async fn agent_from_row(
        &self,
        row: Option<SqliteRow>,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<Agent> {
        let row = row.ok_or(AgentServerError::NoSuchAgent)?;
        let tenant_uuid = parse_uuid(row.get::<String, _>("tenant_uuid"))?;
        if let Some(tenants) = tenant_uuids {
            if !tenants.contains(&tenant_uuid) {
                return Err(AgentServerError::NoSuchAgent);
            }
        }
        let id: i64 = row.get("id");
        let queues = self.memberships(id).await?;
        Ok(Agent {
            id,
            number: row.get("number"),
            tenant_uuid,
            preprocess_subroutine: row.get("preprocess_subroutine"),
            queues,
        })
    }

    async fn memberships(&self, agent_id: i64) -> Result<Vec<AgentQueue>> {
        let rows = sqlx::query(
            "SELECT queue_id, queue_name, penalty FROM queue_members WHERE agent_id = ? ORDER BY queue_name",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| AgentQueue {
                id: row.get("queue_id"),
                name: row.get("queue_name"),
                penalty: row.get("penalty"),
            })
            .collect())
    }
}

fn queue_from_row(row: &SqliteRow) -> Result<Queue> {
    Ok(Queue {
        id: row.get("id"),
        name: row.get("name"),
        tenant_uuid: parse_uuid(row.get::<String, _>("tenant_uuid"))?,
    })
}

pub(crate) fn parse_uuid(value: String) -> Result<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|e| AgentServerError::Internal(format!("invalid uuid in database: {e}")))
}
