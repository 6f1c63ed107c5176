//! Database module - SQLite key/value store for the cached plan and completion flags

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Throwaway database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Insert or overwrite a value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Delete every key starting with `prefix`, returns how many went
    pub fn remove_prefix(&self, prefix: &str) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM kv WHERE substr(key, 1, length(?1)) = ?1",
            params![prefix],
        )?;
        Ok(removed)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_overwrite() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("a").unwrap(), None);

        db.set("a", "1").unwrap();
        db.set("a", "2").unwrap();
        assert_eq!(db.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(db.keys().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_remove_prefix() {
        let db = Database::open_in_memory().unwrap();
        db.set("completed_1", "true").unwrap();
        db.set("completed_2", "false").unwrap();
        db.set("plan_v1", "{}").unwrap();

        assert_eq!(db.remove_prefix("completed_").unwrap(), 2);
        assert_eq!(db.keys().unwrap(), vec!["plan_v1".to_string()]);

        db.remove("plan_v1").unwrap();
        assert!(db.keys().unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekfit.db");
        let path = path.to_str().unwrap();

        Database::open(path).unwrap().set("k", "v").unwrap();
        let reopened = Database::open(path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }
}
