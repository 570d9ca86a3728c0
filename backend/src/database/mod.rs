//! Module for database connection setup and common utilities.
//!
//! This module is responsible for opening the SQLite connection, applying the
//! schema, and handing out access to the connection to higher-level services.

pub mod models;
pub mod queries;
pub mod seed;

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AppResult;

const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS companies (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS departments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id  INTEGER NOT NULL REFERENCES companies(id),
    name        TEXT NOT NULL,
    manager_id  INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (company_id, name)
);

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id     INTEGER NOT NULL REFERENCES companies(id),
    department_id  INTEGER REFERENCES departments(id),
    email          TEXT NOT NULL,
    full_name      TEXT NOT NULL,
    password_hash  TEXT NOT NULL,
    role           TEXT NOT NULL,
    active         INTEGER NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL,
    UNIQUE (company_id, email)
);

CREATE TABLE IF NOT EXISTS products (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id        INTEGER NOT NULL REFERENCES companies(id),
    name              TEXT NOT NULL,
    category          TEXT NOT NULL,
    description       TEXT NOT NULL DEFAULT '',
    unit_price_cents  INTEGER NOT NULL CHECK (unit_price_cents >= 0),
    currency          TEXT NOT NULL,
    active            INTEGER NOT NULL DEFAULT 1,
    UNIQUE (company_id, name)
);

CREATE TABLE IF NOT EXISTS purchase_requests (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id     INTEGER NOT NULL REFERENCES companies(id),
    requester_id   INTEGER NOT NULL REFERENCES users(id),
    department_id  INTEGER NOT NULL REFERENCES departments(id),
    title          TEXT NOT NULL,
    description    TEXT NOT NULL DEFAULT '',
    justification  TEXT NOT NULL DEFAULT '',
    priority       TEXT NOT NULL,
    status         TEXT NOT NULL,
    current_step   TEXT,
    total_cents    INTEGER NOT NULL,
    currency       TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_requests_company_status ON purchase_requests(company_id, status);
CREATE INDEX IF NOT EXISTS idx_requests_requester ON purchase_requests(requester_id);

CREATE TABLE IF NOT EXISTS request_items (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id        INTEGER NOT NULL REFERENCES purchase_requests(id) ON DELETE CASCADE,
    product_id        INTEGER REFERENCES products(id),
    description       TEXT NOT NULL,
    quantity          INTEGER NOT NULL CHECK (quantity > 0),
    unit_price_cents  INTEGER NOT NULL CHECK (unit_price_cents >= 0)
);

CREATE TABLE IF NOT EXISTS approvals (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id   INTEGER NOT NULL REFERENCES purchase_requests(id) ON DELETE CASCADE,
    step         TEXT NOT NULL,
    approver_id  INTEGER NOT NULL REFERENCES users(id),
    decision     TEXT NOT NULL,
    comment      TEXT,
    decided_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attachments (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id     INTEGER NOT NULL REFERENCES companies(id),
    request_id     INTEGER NOT NULL REFERENCES purchase_requests(id) ON DELETE CASCADE,
    uploader_id    INTEGER NOT NULL REFERENCES users(id),
    original_name  TEXT NOT NULL,
    stored_name    TEXT NOT NULL UNIQUE,
    content_type   TEXT NOT NULL,
    size_bytes     INTEGER NOT NULL,
    sha256         TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id  INTEGER NOT NULL REFERENCES companies(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    kind        TEXT NOT NULL,
    message     TEXT NOT NULL,
    request_id  INTEGER REFERENCES purchase_requests(id) ON DELETE CASCADE,
    read        INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, read);

CREATE TABLE IF NOT EXISTS todos (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    text        TEXT NOT NULL,
    done        INTEGER NOT NULL DEFAULT 0,
    due_date    TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS calendar_events (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id   INTEGER NOT NULL REFERENCES companies(id),
    owner_id     INTEGER NOT NULL REFERENCES users(id),
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    starts_at    TEXT NOT NULL,
    ends_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_company_start ON calendar_events(company_id, starts_at);
";

/// Cloneable handle to the application's SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at `path`. `:memory:` opens a private in-memory database.
    pub fn open(path: &str) -> AppResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        Self::from_connection(conn)
    }

    pub fn in_memory() -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        Ok(db)
    }

    /// Creates missing tables and records the schema version.
    pub async fn migrate(&self) -> AppResult<()> {
        self.call(|conn| {
            let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
            if version < SCHEMA_VERSION {
                conn.execute_batch(SCHEMA)?;
                conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
                info!(from = version, to = SCHEMA_VERSION, "database schema migrated");
            }
            Ok(())
        })
        .await
    }

    /// Runs `f` with exclusive access to the connection.
    pub async fn call<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        let mut conn = self.conn.lock().await;
        f(&mut conn)
    }

    /// Runs `f` inside a transaction that commits only when `f` succeeds.
    pub async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let db = Database::in_memory().expect("open");
        db.migrate().await.expect("first migration");
        db.migrate().await.expect("second migration");

        let version: i64 = db
            .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?))
            .await
            .expect("version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn failed_transaction_rolls_back() {
        let db = Database::in_memory().expect("open");
        db.migrate().await.expect("migrate");

        let result: AppResult<()> = db
            .transaction(|tx| {
                tx.execute(
                    "INSERT INTO companies (name, slug, created_at) VALUES ('A', 'a', '2024-01-01T00:00:00Z')",
                    [],
                )?;
                Err(crate::errors::AppError::Internal("boom".to_string()))
            })
            .await;
        assert!(result.is_err());

        let count: i64 = db
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?))
            .await
            .expect("count");
        assert_eq!(count, 0);
    }
}
