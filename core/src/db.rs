use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{StoreError, StoreResult};

/// Byte budget across all stored keys and values, matching the usual
/// browser local-storage limit.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Durable string key-value storage on top of SQLite.
///
/// Each collection lives under one key as a JSON document. Writes are
/// rejected once the combined size of all keys and values would exceed
/// the quota.
pub struct Database {
    conn: Connection,
    quota_bytes: usize,
}

impl Database {
    pub fn open(path: &Path, quota_bytes: usize) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn, quota_bytes };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory(quota_bytes: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn, quota_bytes };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn
                .execute_batch(
                    "CREATE TABLE IF NOT EXISTS kv_store (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    );

                    PRAGMA user_version = 1;",
                )
                .context("Failed to create kv_store table")?;
        }

        Ok(())
    }

    #[must_use]
    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    pub fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let others: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv_store WHERE key != ?1",
            params![key],
            |row| row.get(0),
        )?;
        let needed = usize::try_from(others).unwrap_or(0) + key.len() + value.len();
        if needed > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                limit: self.quota_bytes,
            });
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> StoreResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    pub fn used_bytes(&self) -> StoreResult<usize> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv_store",
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(used).unwrap_or(0))
    }

    /// Run `f` inside one SQLite transaction. Any error rolls back every
    /// write `f` made.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> StoreResult<T>) -> StoreResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }
}
