//! Device-local key-value snapshot store.
//!
//! Payloads are opaque text (JSON in practice); serialization lives in the
//! snapshot service.

use crate::repo::{ensure_connection_ready, now_epoch_ms, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait SnapshotRepository {
    /// Inserts or replaces the payload stored under `key`.
    fn put_snapshot(&self, key: &str, payload: &str) -> RepoResult<()>;
    fn get_snapshot(&self, key: &str) -> RepoResult<Option<String>>;
    /// Removes one key; returns `false` when it was absent.
    fn delete_snapshot(&self, key: &str) -> RepoResult<bool>;
    /// Removes every key; returns the number of removed entries.
    fn clear_snapshots(&self) -> RepoResult<usize>;
}

pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn put_snapshot(&self, key: &str, payload: &str) -> RepoResult<()> {
        if key.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "snapshot key cannot be empty".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT INTO snapshots (key, payload, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (key) DO UPDATE
             SET payload = excluded.payload, updated_at = excluded.updated_at;",
            params![key, payload, now_epoch_ms()],
        )?;
        Ok(())
    }

    fn get_snapshot(&self, key: &str) -> RepoResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn delete_snapshot(&self, key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM snapshots WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn clear_snapshots(&self) -> RepoResult<usize> {
        let changed = self.conn.execute("DELETE FROM snapshots;", [])?;
        Ok(changed)
    }
}
