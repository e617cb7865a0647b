//! Per-domain API token storage.
//!
//! A small SQLite key-value table keyed by `tokens_<domain>`, holding the
//! JSON-encoded token pair. Records are overwritten on save and never
//! deleted.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{AppError, Result, TokenRecord};

/// Durable token storage backed by SQLite.
pub struct TokenStore {
    conn: Connection,
}

impl TokenStore {
    /// Opens or creates the token database.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;
        Self::with_connection(conn)
    }

    /// Opens a throwaway in-memory store.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            ",
        )
        .map_err(AppError::database)?;

        Ok(Self { conn })
    }

    fn key(domain: &str) -> String {
        format!("tokens_{domain}")
    }

    /// Store the token pair for `domain`, replacing any previous record.
    ///
    /// # Errors
    /// Returns error if the record cannot be written.
    pub fn set_token(
        &self,
        domain: &str,
        emoji_api_token: &str,
        drive_api_token: &str,
    ) -> Result<()> {
        let record = TokenRecord::new(emoji_api_token, drive_api_token);
        let value = serde_json::to_string(&record).map_err(AppError::json_parse)?;

        self.conn
            .execute(
                r"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
                params![Self::key(domain), value],
            )
            .map_err(AppError::database)?;

        tracing::debug!(domain, "Token record saved");

        Ok(())
    }

    /// Read the token pair for `domain`.
    ///
    /// A missing or unreadable record yields empty tokens.
    ///
    /// # Errors
    /// Returns error only if the database itself cannot be queried.
    pub fn get_token(&self, domain: &str) -> Result<TokenRecord> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                [Self::key(domain)],
                |row| row.get(0),
            )
            .optional()
            .map_err(AppError::database)?;

        let Some(value) = value else {
            return Ok(TokenRecord::default());
        };

        match serde_json::from_str(&value) {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(domain, error = %e, "Stored token record is unreadable, treating as empty");
                Ok(TokenRecord::default())
            }
        }
    }
}
