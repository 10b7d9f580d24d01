use anyhow::{bail, Context, Result};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Row, Sqlite};
use std::str::FromStr;
use time::OffsetDateTime;

use crate::model::{NewQrCode, SavedQrCode, UserData};

use super::accounts::AccountStore;
use super::SCHEMA_VERSION;

/// Database abstraction for SQLite operations
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true);

        // A single connection serializes writers and keeps `:memory:` databases alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Initialize database schema, returns true if it was created by this call
    pub async fn init_schema(&self) -> Result<bool> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )"
        ).execute(&self.pool).await?;

        let stored_version: Option<String> = sqlx::query("SELECT value FROM metadata WHERE key = 'schema_version'")
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.get("value"));

        if let Some(version) = stored_version.as_deref() {
            if version != SCHEMA_VERSION {
                bail!("Unsupported schema version {} (expected {})", version, SCHEMA_VERSION);
            }
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS qr_codes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                kind TEXT NOT NULL,
                image BLOB NOT NULL,
                created_at INTEGER NOT NULL
            )"
        ).execute(&self.pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )"
        ).execute(&self.pool).await?;

        let created = stored_version.is_none();
        if created {
            sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)")
                .bind(SCHEMA_VERSION)
                .execute(&self.pool)
                .await?;
        }

        Ok(created)
    }

    /// Get metadata value by key
    pub async fn get_metadata(&self, key: &str) -> Option<String> {
        sqlx::query("SELECT value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
            .map(|row| row.get("value"))
    }

    /// Set metadata value
    pub async fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store a generated QR code, returns its id
    pub async fn insert_qr_code(&self, code: &NewQrCode) -> Result<i64> {
        let created_at = OffsetDateTime::now_utc().unix_timestamp();
        let result = sqlx::query(
            "INSERT INTO qr_codes (content, kind, image, created_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&code.content)
        .bind(&code.kind)
        .bind(code.image.as_slice())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("Failed to save QR code")?;

        Ok(result.last_insert_rowid())
    }

    /// All saved QR codes, newest first
    pub async fn list_qr_codes(&self) -> Result<Vec<SavedQrCode>> {
        let rows = sqlx::query(
            "SELECT id, content, kind, image, created_at FROM qr_codes ORDER BY created_at DESC, id DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| SavedQrCode {
            id: row.get("id"),
            content: row.get("content"),
            kind: row.get("kind"),
            image: row.get("image"),
            created_at: row.get("created_at"),
        }).collect())
    }

    pub async fn get_qr_code(&self, id: i64) -> Result<Option<SavedQrCode>> {
        let row = sqlx::query("SELECT id, content, kind, image, created_at FROM qr_codes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| SavedQrCode {
            id: row.get("id"),
            content: row.get("content"),
            kind: row.get("kind"),
            image: row.get("image"),
            created_at: row.get("created_at"),
        }))
    }

    /// Delete a saved QR code, returns false if no row had that id
    pub async fn delete_qr_code(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM qr_codes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_qr_codes(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM qr_codes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

impl AccountStore for Database {
    async fn get_account(&self, key: &str) -> Result<Option<UserData>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM accounts WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        value
            .map(|raw| serde_json::from_str(&raw).context("Malformed account record"))
            .transpose()
    }

    async fn put_account(&self, key: &str, user: &UserData) -> Result<()> {
        let raw = serde_json::to_string(user)?;
        sqlx::query("INSERT OR REPLACE INTO accounts (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(raw)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
