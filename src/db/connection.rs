use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// Handle to the local libsql database holding dining records and the
/// deals cache. Cheap to clone; all clones share one underlying database.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
}

impl Database {
    /// Open (or create) the database and ensure the schema exists.
    /// Safe to call on an already-initialized database.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db = if config.url == ":memory:" {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let database = Self { db: Arc::new(db) };
        database.configure().await?;
        database.init_schema().await?;

        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    async fn configure(&self) -> Result<()> {
        let conn = self.connect()?;

        if let Err(error) = conn.execute_batch("PRAGMA busy_timeout = 5000").await {
            tracing::warn!(error = %error, "Failed to set SQLite busy_timeout");
        }
        if let Err(error) = conn.execute_batch("PRAGMA journal_mode = WAL").await {
            tracing::warn!(error = %error, "Failed to set SQLite journal_mode");
        }
        if let Err(error) = conn.execute_batch("PRAGMA synchronous = NORMAL").await {
            tracing::warn!(error = %error, "Failed to set SQLite synchronous pragma");
        }

        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        schema::init_schema(&conn).await?;
        Ok(())
    }
}
