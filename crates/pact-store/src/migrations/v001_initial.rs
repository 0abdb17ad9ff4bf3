//! v001 -- Initial schema creation.
//!
//! A single key-value table carries everything the client persists
//! locally: encoded per-user documents, the local credential registry,
//! the session marker and runtime configuration values.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Key-value storage
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
