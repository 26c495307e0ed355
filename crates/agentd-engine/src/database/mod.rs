//! Database access layer (sqlx + SQLite).
//!
//! One store type per concern: the read-only agent/queue directory, the
//! live login status store, queue memberships, and the append-only queue
//! log. Every store call is its own short transaction scope; workflows
//! never hold a transaction across steps.

pub mod agent_directory;
pub mod agent_status;
pub mod queue_log;
pub mod queue_member;

pub use agent_directory::AgentDirectory;
pub use agent_status::AgentStatusStore;
pub use queue_log::{QueueLogEntry, QueueLogStore};
pub use queue_member::QueueMemberStore;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::Result;

/// Owns the connection pool and the schema.
#[derive(Clone)]
pub struct DbManager {
    pool: SqlitePool,
}

impl DbManager {
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("initializing database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        // An in-memory database exists per connection; cap the pool at one
        // connection and keep it alive so the schema survives.
        let mut pool_options = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        let manager = Self { pool };
        manager.init_schema().await?;
        info!("database ready (WAL mode)");
        Ok(manager)
    }

    /// In-memory database, used by tests.
    pub async fn new_in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn agent_directory(&self) -> AgentDirectory {
        AgentDirectory::new(self.pool.clone())
    }

    pub fn agent_status_store(&self) -> AgentStatusStore {
        AgentStatusStore::new(self.pool.clone())
    }

    pub fn queue_member_store(&self) -> QueueMemberStore {
        QueueMemberStore::new(self.pool.clone())
    }

    pub fn queue_log_store(&self) -> QueueLogStore {
        QueueLogStore::new(self.pool.clone())
    }

    async fn init_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS agents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                number TEXT NOT NULL UNIQUE,
                tenant_uuid TEXT NOT NULL,
                preprocess_subroutine TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS queues (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                tenant_uuid TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS extensions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exten TEXT NOT NULL,
                context TEXT NOT NULL,
                UNIQUE (exten, context)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS queue_members (
                agent_id INTEGER NOT NULL,
                agent_number TEXT NOT NULL,
                queue_id INTEGER NOT NULL,
                queue_name TEXT NOT NULL,
                penalty INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (agent_id, queue_name)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS agent_login_status (
                agent_id INTEGER PRIMARY KEY,
                agent_number TEXT NOT NULL,
                tenant_uuid TEXT NOT NULL,
                extension TEXT,
                context TEXT,
                logged INTEGER NOT NULL DEFAULT 0,
                paused INTEGER NOT NULL DEFAULT 0,
                paused_reason TEXT,
                login_at TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS queue_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                time TEXT NOT NULL,
                callid TEXT NOT NULL,
                queuename TEXT NOT NULL,
                agent TEXT NOT NULL,
                event TEXT NOT NULL,
                data1 TEXT,
                data2 TEXT,
                data3 TEXT
            )
            "#,
        ];
        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}
