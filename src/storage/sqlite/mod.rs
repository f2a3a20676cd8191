//! SQLite entity store.
//!
//! Pool-based reads plus `&mut SqliteConnection` write helpers intended to
//! run inside a `BEGIN IMMEDIATE` transaction. The immediate transaction
//! acquires the writer lock up front, so a read-then-conditionally-write
//! sequence (status guards, assignment side effects) can never interleave
//! with a concurrent writer.

mod aggregates;
mod reads;
mod writes;

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use crate::error::{CoreError, Result};
use crate::storage::schema;

/// SQLite implementation of the entity store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite entity store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init(&self) -> Result<()> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        for ddl in schema::CREATE_TABLES {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Acquire a connection holding the writer lock.
    ///
    /// BEGIN IMMEDIATE acquires the write lock upfront, preventing deadlocks
    /// when concurrent DEFERRED transactions race to upgrade from shared to
    /// exclusive. Lock contention beyond the busy timeout surfaces as
    /// [`CoreError::Conflict`].
    pub async fn begin(&self) -> Result<PoolConnection<Sqlite>> {
        let mut conn = self.pool.acquire().await?;
        match sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await {
            Ok(_) => Ok(conn),
            Err(e) if is_locked(&e) => Err(CoreError::Conflict(
                "concurrent write in progress".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Commit the transaction started by [`SqliteStore::begin`].
    pub async fn commit(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query("COMMIT").execute(&mut *conn).await?;
        Ok(())
    }

    /// Roll back the transaction started by [`SqliteStore::begin`].
    ///
    /// Best effort; the connection is returned to the pool either way and
    /// SQLite rolls back an open transaction on connection reset.
    pub async fn rollback(conn: &mut SqliteConnection) {
        let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
    }
}

fn is_locked(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.message().contains("database is locked"))
}
