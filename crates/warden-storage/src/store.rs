//! Preference store connection and operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::Result;

pub struct PreferenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl PreferenceStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM preferences WHERE key = ?1",
                    [key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, updated_at],
            )?;
            Ok(())
        })
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM preferences WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.as_deref() == Some("true"))
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }

    /// Wipe every stored preference except the given keys, which are read
    /// out first and written back after the wipe.
    pub fn clear_preserving(&self, keys: &[&str]) -> Result<()> {
        let mut preserved: HashMap<String, String> = HashMap::new();
        for key in keys {
            if let Some(value) = self.get(key)? {
                preserved.insert((*key).to_string(), value);
            }
        }

        self.with_connection(|conn| {
            conn.execute("DELETE FROM preferences", [])?;
            Ok(())
        })?;

        for (key, value) in &preserved {
            self.set(key, value)?;
        }

        tracing::debug!(preserved = preserved.len(), "Cleared preference store");

        Ok(())
    }
}

impl Clone for PreferenceStore {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let store = PreferenceStore::open_in_memory().unwrap();

        assert_eq!(store.get("theme").unwrap(), None);

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap(), Some("dark".to_string()));

        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap(), Some("light".to_string()));

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn test_bool_round_trip() {
        let store = PreferenceStore::open_in_memory().unwrap();

        assert!(!store.get_bool("authenticated").unwrap());

        store.set_bool("authenticated", true).unwrap();
        assert!(store.get_bool("authenticated").unwrap());

        store.set_bool("authenticated", false).unwrap();
        assert!(!store.get_bool("authenticated").unwrap());
    }

    #[test]
    fn test_clear_preserving() {
        let store = PreferenceStore::open_in_memory().unwrap();

        store.set("theme", "dark").unwrap();
        store.set("accent", "blurple").unwrap();
        store.set_bool("authenticated", true).unwrap();
        store.set("last_page", "/transactions").unwrap();

        store.clear_preserving(&["theme", "accent"]).unwrap();

        assert_eq!(store.get("theme").unwrap(), Some("dark".to_string()));
        assert_eq!(store.get("accent").unwrap(), Some("blurple".to_string()));
        assert_eq!(store.get("authenticated").unwrap(), None);
        assert_eq!(store.get("last_page").unwrap(), None);
    }

    #[test]
    fn test_clear_preserving_missing_key() {
        let store = PreferenceStore::open_in_memory().unwrap();

        store.set("last_page", "/accounts").unwrap();
        store.clear_preserving(&["theme"]).unwrap();

        assert_eq!(store.get("theme").unwrap(), None);
        assert_eq!(store.get("last_page").unwrap(), None);
    }
}
