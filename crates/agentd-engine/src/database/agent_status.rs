//! Live agent login status store.
//!
//! Single source of truth for who is logged in where. Rows are created on
//! first login and flipped to logged-out afterwards, never deleted.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::agent::AgentStatus;
use crate::database::agent_directory::parse_uuid;
use crate::error::Result;

#[derive(Clone)]
pub struct AgentStatusStore {
    pool: SqlitePool,
}

const STATUS_COLUMNS: &str = "agent_id, agent_number, tenant_uuid, extension, context, logged, paused, paused_reason, login_at";

impl AgentStatusStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_status(
        &self,
        agent_id: i64,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<Option<AgentStatus>> {
        let row = sqlx::query(&format!(
            "SELECT {STATUS_COLUMNS} FROM agent_login_status WHERE agent_id = ?"
        ))
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await?;
        filtered_status(row, tenant_uuids)
    }

    pub async fn get_status_by_number(
        &self,
        agent_number: &str,
        tenant_uuids: Option<&[Uuid]>,
    ) -> Result<Option<AgentStatus>> {
        let row = sqlx::query(&format!(
            "SELECT {STATUS_COLUMNS} FROM agent_login_status WHERE agent_number = ?"
        ))
        .bind(agent_number)
        .fetch_optional(&self.pool)
        .await?;
        filtered_status(row, tenant_uuids)
    }

    /// All currently logged-in statuses.
    pub async fn get_logged_statuses(&self) -> Result<Vec<AgentStatus>> {
        let rows = sqlx::query(&format!(
            "SELECT {STATUS_COLUMNS} FROM agent_login_status WHERE logged = 1 ORDER BY agent_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(status_from_row).collect()
    }

    /// True when another logged-in agent already uses the extension/context.
    pub async fn is_extension_in_use(&self, extension: &str, context: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM agent_login_status WHERE logged = 1 AND extension = ? AND context = ?",
        )
        .bind(extension)
        .bind(context)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("n") > 0)
    }

    /// Record a successful login, creating the row on first login.
    pub async fn log_in_agent(
        &self,
        agent_id: i64,
        agent_number: &str,
        tenant_uuid: Uuid,
        extension: &str,
        context: &str,
        login_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO agent_login_status
                (agent_id, agent_number, tenant_uuid, extension, context, logged, paused, paused_reason, login_at)
            VALUES (?, ?, ?, ?, ?, 1, 0, NULL, ?)
            ON CONFLICT(agent_id) DO UPDATE SET
                agent_number = excluded.agent_number,
                tenant_uuid = excluded.tenant_uuid,
                extension = excluded.extension,
                context = excluded.context,
                logged = 1,
                paused = 0,
                paused_reason = NULL,
                login_at = excluded.login_at
            "#,
        )
        .bind(agent_id)
        .bind(agent_number)
        .bind(tenant_uuid.to_string())
        .bind(extension)
        .bind(context)
        .bind(login_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a logoff, clearing extension/context/pause state.
    pub async fn log_off_agent(&self, agent_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE agent_login_status
            SET logged = 0, extension = NULL, context = NULL,
                paused = 0, paused_reason = NULL, login_at = NULL
            WHERE agent_id = ?
            "#,
        )
        .bind(agent_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Pause state only exists for logged-in agents; a logged-out row is
    /// left untouched.
    pub async fn update_pause(
        &self,
        agent_id: i64,
        paused: bool,
        reason: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE agent_login_status SET paused = ?, paused_reason = ? WHERE agent_id = ? AND logged = 1",
        )
            .bind(paused)
            .bind(reason)
            .bind(agent_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn filtered_status(
    row: Option<SqliteRow>,
    tenant_uuids: Option<&[Uuid]>,
) -> Result<Option<AgentStatus>> {
    let Some(row) = row else {
        return Ok(None);
    };
    let status = status_from_row(&row)?;
    if let Some(tenants) = tenant_uuids {
        if !tenants.contains(&status.tenant_uuid) {
            return Ok(None);
        }
    }
    Ok(Some(status))
}

fn status_from_row(row: &SqliteRow) -> Result<AgentStatus> {
    Ok(AgentStatus {
        agent_id: row.get("agent_id"),
        agent_number: row.get("agent_number"),
        tenant_uuid: parse_uuid(row.get::<String, _>("tenant_uuid"))?,
        extension: row.get("extension"),
        context: row.get("context"),
        logged: row.get("logged"),
        paused: row.get("paused"),
        paused_reason: row.get("paused_reason"),
        login_at: row.get("login_at"),
    })
}
