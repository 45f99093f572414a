//! SQLite sink implementation
//!
//! This module provides a SQLite-based implementation of the Sink trait.

use crate::sink::schema::{clear_pages, initialize_schema};
use crate::sink::traits::{Sink, SinkError, SinkResult};
use crate::sink::PageRecord;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// SQLite sink backend
///
/// The connection is opened by `connect` and dropped by `disconnect`; inserts outside that
/// window are discarded.
pub struct SqliteSink {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteSink {
    /// Creates a sink for the database at `path`
    ///
    /// Nothing is opened until `connect` is called. `:memory:` gives a private in-memory
    /// database.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: Mutex::new(None),
        }
    }

    /// Number of stored page records
    pub fn count(&self) -> SinkResult<u64> {
        let guard = self.lock();
        let Some(conn) = guard.as_ref() else {
            return Ok(0);
        };
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        // COUNT(*) is never negative
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Loads every stored record in insertion order
    pub fn records(&self) -> SinkResult<Vec<PageRecord>> {
        let guard = self.lock();
        let Some(conn) = guard.as_ref() else {
            return Ok(Vec::new());
        };

        let mut stmt = conn.prepare("SELECT url, title, content FROM pages ORDER BY id")?;
        let records = stmt
            .query_map([], |row| {
                Ok(PageRecord {
                    url: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn open(&self) -> SinkResult<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(|e| SinkError::Connect(format!("{}: {}", self.path.display(), e)))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        Ok(conn)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Sink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self) -> SinkResult<()> {
        let conn = self.open()?;
        let wiped = clear_pages(&conn)?;
        tracing::info!(
            "Connected sink {} (cleared {} previous records)",
            self.path.display(),
            wiped
        );
        *self.lock() = Some(conn);
        Ok(())
    }

    fn insert(&self, record: &PageRecord) -> SinkResult<()> {
        let guard = self.lock();
        let Some(conn) = guard.as_ref() else {
            return Ok(());
        };

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO pages (url, title, content, crawled_at) VALUES (?1, ?2, ?3, ?4)",
            params![record.url, record.title, record.content, now],
        )?;
        Ok(())
    }

    fn disconnect(&self) -> SinkResult<()> {
        if let Some(conn) = self.lock().take() {
            conn.close().map_err(|(_, e)| SinkError::Sqlite(e))?;
            tracing::debug!("Disconnected sink {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: format!("Title of {}", url),
            content: "Some content".to_string(),
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let sink = SqliteSink::new(":memory:");
        sink.connect().unwrap();

        sink.insert(&record("https://a.example/")).unwrap();
        sink.insert(&record("https://b.example/")).unwrap();

        assert_eq!(sink.count().unwrap(), 2);
        let records = sink.records().unwrap();
        assert_eq!(records[0], record("https://a.example/"));
        assert_eq!(records[1].url, "https://b.example/");
    }

    #[test]
    fn test_connect_wipes_previous_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pages.db");

        let first = SqliteSink::new(&path);
        first.connect().unwrap();
        first.insert(&record("https://old.example/")).unwrap();
        first.disconnect().unwrap();

        let second = SqliteSink::new(&path);
        second.connect().unwrap();
        assert_eq!(second.count().unwrap(), 0);

        second.insert(&record("https://new.example/")).unwrap();
        assert_eq!(second.count().unwrap(), 1);
    }

    #[test]
    fn test_records_persist_after_disconnect() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pages.db");

        let sink = SqliteSink::new(&path);
        sink.connect().unwrap();
        sink.insert(&record("https://a.example/")).unwrap();
        sink.disconnect().unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_insert_before_connect_is_noop() {
        let sink = SqliteSink::new(":memory:");
        assert!(sink.insert(&record("https://a.example/")).is_ok());
        assert_eq!(sink.count().unwrap(), 0);
    }

    #[test]
    fn test_disconnect_twice_is_ok() {
        let sink = SqliteSink::new(":memory:");
        sink.connect().unwrap();
        assert!(sink.disconnect().is_ok());
        assert!(sink.disconnect().is_ok());
    }

    #[test]
    fn test_connect_failure() {
        let sink = SqliteSink::new("/nonexistent-dir/deeper/pages.db");
        let err = sink.connect().unwrap_err();
        assert!(matches!(err, SinkError::Connect(_)));
    }
}
