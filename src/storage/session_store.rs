use rusqlite::{OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use super::database::Database;
use crate::common::Session;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USERNAME_KEY: &str = "username";
pub const DARK_MODE_KEY: &str = "darkMode";

/// Persisted key-value store for the signed-in session and UI preferences.
///
/// Filled from outside (login happens elsewhere), read when the client starts,
/// wiped entirely on logout.
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        Self::init(Database::open(path)?)
    }

    pub fn in_memory() -> SqlResult<Self> {
        Self::init(Database::in_memory()?)
    }

    fn init(db: Database) -> SqlResult<Self> {
        db.connection().execute(
            "CREATE TABLE IF NOT EXISTS session (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { db })
    }

    pub fn get(&self, key: &str) -> SqlResult<Option<String>> {
        self.db
            .connection()
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn set(&self, key: &str, value: &str) -> SqlResult<()> {
        self.db.connection().execute(
            "INSERT OR REPLACE INTO session (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> SqlResult<()> {
        self.db
            .connection()
            .execute("DELETE FROM session WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Drop every stored key, preferences included.
    pub fn clear(&self) -> SqlResult<()> {
        self.db.connection().execute("DELETE FROM session", [])?;
        Ok(())
    }

    pub fn load_session(&self) -> SqlResult<Session> {
        Ok(Session::new(
            self.get(ACCESS_TOKEN_KEY)?,
            self.get(USERNAME_KEY)?,
        ))
    }

    pub fn save_session(&self, session: &Session) -> SqlResult<()> {
        for (key, value) in [
            (ACCESS_TOKEN_KEY, &session.access_token),
            (USERNAME_KEY, &session.username),
        ] {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }

    pub fn dark_mode(&self) -> SqlResult<bool> {
        Ok(self.get(DARK_MODE_KEY)?.as_deref() == Some("true"))
    }

    pub fn set_dark_mode(&self, enabled: bool) -> SqlResult<()> {
        self.set(DARK_MODE_KEY, if enabled { "true" } else { "false" })
    }
}
