//! Append-only queue log store.
//!
//! The queue log keeps the legacy column layout: two fixed placeholder
//! columns, an `Agent/<number>` actor, an event code, and up to three data
//! columns. Entries are never updated or deleted here.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct QueueLogEntry {
    pub time: String,
    pub callid: String,
    pub queuename: String,
    pub agent: String,
    pub event: String,
    pub data1: Option<String>,
    pub data2: Option<String>,
    pub data3: Option<String>,
}

#[derive(Clone)]
pub struct QueueLogStore {
    pool: SqlitePool,
}

impl QueueLogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_entry(
        &self,
        time: &str,
        callid: &str,
        queuename: &str,
        agent: &str,
        event: &str,
        data1: Option<&str>,
        data2: Option<&str>,
        data3: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO queue_log (time, callid, queuename, agent, event, data1, data2, data3) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(time)
        .bind(callid)
        .bind(queuename)
        .bind(agent)
        .bind(event)
        .bind(data1)
        .bind(data2)
        .bind(data3)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Entries recorded for one `Agent/<number>` actor, oldest first.
    pub async fn entries_for_agent(&self, agent: &str) -> Result<Vec<QueueLogEntry>> {
        let rows = sqlx::query(
            "SELECT time, callid, queuename, agent, event, data1, data2, data3 FROM queue_log WHERE agent = ? ORDER BY id",
        )
        .bind(agent)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }
}

fn entry_from_row(row: &SqliteRow) -> QueueLogEntry {
    QueueLogEntry {
        time: row.get("time"),
        callid: row.get("callid"),
        queuename: row.get("queuename"),
        agent: row.get("agent"),
        event: row.get("event"),
        data1: row.get("data1"),
        data2: row.get("data2"),
        data3: row.get("data3"),
    }
}
