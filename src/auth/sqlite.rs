// SQLite-backed credential store
// Key/value token table so a session survives process restarts. Read and
// write failures degrade to an empty session rather than poisoning the
// pipeline, matching the in-memory store's infallible interface.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

use super::store::CredentialStore;

const ACCESS_KEY: &str = "session:access-token";
const REFRESH_KEY: &str = "session:refresh-token";

pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    /// Open the token table at the given path, creating it if missing
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS session_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .context("Failed to create session_kv table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn get(&self, key: &str) -> Option<String> {
        let conn = self.lock();
        match conn.query_row("SELECT value FROM session_kv WHERE key = ?1", [key], |row| {
            row.get(0)
        }) {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                tracing::error!("Failed to read {} from session store: {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) {
        let conn = self.lock();
        if let Err(e) = conn.execute(
            "INSERT INTO session_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        ) {
            tracing::error!("Failed to write {} to session store: {}", key, e);
        }
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_KEY)
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        self.put(ACCESS_KEY, access_token);
        self.put(REFRESH_KEY, refresh_token);
    }

    fn clear(&self) {
        let conn = self.lock();
        if let Err(e) = conn.execute(
            "DELETE FROM session_kv WHERE key IN (?1, ?2)",
            [ACCESS_KEY, REFRESH_KEY],
        ) {
            tracing::error!("Failed to clear session store: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("session-store-{}-{}.db", std::process::id(), name))
    }

    #[test]
    fn test_roundtrip() {
        let path = temp_db("roundtrip");
        let _ = std::fs::remove_file(&path);

        let store = SqliteCredentialStore::open(&path).unwrap();
        assert!(store.access_token().is_none());

        store.set_tokens("a-1", "r-1");
        assert_eq!(store.access_token().as_deref(), Some("a-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r-1"));

        // Updates overwrite, not duplicate
        store.set_tokens("a-2", "r-2");
        assert_eq!(store.access_token().as_deref(), Some("a-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("r-2"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_persists_across_reopen() {
        let path = temp_db("reopen");
        let _ = std::fs::remove_file(&path);

        {
            let store = SqliteCredentialStore::open(&path).unwrap();
            store.set_tokens("a-1", "r-1");
        }

        let store = SqliteCredentialStore::open(&path).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("a-1"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_clear_drops_both_tokens() {
        let path = temp_db("clear");
        let _ = std::fs::remove_file(&path);

        let store = SqliteCredentialStore::open(&path).unwrap();
        store.set_tokens("a-1", "r-1");
        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());

        let _ = std::fs::remove_file(&path);
    }
}
