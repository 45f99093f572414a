//! Database schema definitions
//!
//! This module contains the SQL schema for the page record database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawled page
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    crawled_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Deletes every stored page record
pub fn clear_pages(conn: &rusqlite::Connection) -> Result<usize, rusqlite::Error> {
    conn.execute("DELETE FROM pages", [])
}
