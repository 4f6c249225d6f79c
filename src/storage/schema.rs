//! Database schema definitions.
//!
//! Every statement uses `IF NOT EXISTS`, so the schema is applied on each
//! open of the store.

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the spark store.
///
/// Timestamps are stored as INTEGER (Unix milliseconds, UTC).
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- Contexts: one row per project working directory
CREATE TABLE IF NOT EXISTS contexts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    working_directory TEXT NOT NULL UNIQUE,
    project_name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

-- Sparks: captured ideas, owned by a context
CREATE TABLE IF NOT EXISTS sparks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL CHECK (length(content) > 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    context_id INTEGER NOT NULL,
    FOREIGN KEY (context_id) REFERENCES contexts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sparks_context ON sparks(context_id);
CREATE INDEX IF NOT EXISTS idx_sparks_context_created ON sparks(context_id, created_at);

-- Collections: named tags
CREATE TABLE IF NOT EXISTS collections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Spark <-> Collection membership
CREATE TABLE IF NOT EXISTS spark_collections (
    spark_id INTEGER NOT NULL,
    collection_id INTEGER NOT NULL,
    PRIMARY KEY (spark_id, collection_id),
    FOREIGN KEY (spark_id) REFERENCES sparks(id) ON DELETE CASCADE,
    FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_spark_collections_collection ON spark_collections(collection_id);
";

/// Apply the schema to the database.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}
