//! SQLite Database Handle
//! Mission: One shared connection with the schema applied at startup

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared database connection used by all stores.
pub type Db = Arc<Mutex<Connection>>;

/// Schema for the users and orders tables.
///
/// Uniqueness of username/email and the order enum values are enforced here;
/// the stores pre-check duplicates only to produce friendlier error messages.
const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_staff INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    quantity INTEGER NOT NULL,
    order_status TEXT NOT NULL
        CHECK (order_status IN ('pending', 'in-progress', 'delivered')),
    pizza_size TEXT NOT NULL
        CHECK (pizza_size IN ('small', 'medium', 'large', 'extra-large')),
    flavour INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
"#;

/// Open (or create) the database and apply the schema.
pub fn open(db_path: &str) -> Result<Db> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.execute_batch(SCHEMA_SQL)
        .context("Failed to initialize database schema")?;

    // Verify WAL mode is active
    let journal_mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap_or_default();

    if journal_mode.to_lowercase() != "wal" {
        warn!("WAL mode not active, journal_mode = {}", journal_mode);
    }

    info!("📊 Database initialized at: {}", db_path);

    Ok(Arc::new(Mutex::new(conn)))
}
