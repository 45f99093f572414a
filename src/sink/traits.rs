//! Sink trait and error types
//!
//! This module defines the trait interface for page record persistence and its error type.

use crate::sink::PageRecord;
use thiserror::Error;

/// Errors that can occur during sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink is not configured")]
    NotConfigured,

    #[error("Failed to connect sink: {0}")]
    Connect(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for page record persistence backends
///
/// Implementations are shared between concurrently running parse tasks, so every method takes
/// `&self` and the backend synchronizes internally.
pub trait Sink: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Establishes persistence and wipes every previously stored record
    fn connect(&self) -> SinkResult<()>;

    /// Persists one page record
    ///
    /// Disabled or disconnected sinks accept and discard the record.
    fn insert(&self, record: &PageRecord) -> SinkResult<()>;

    /// Releases persistence resources; called once at crawl end
    fn disconnect(&self) -> SinkResult<()>;

    /// Returns true if inserted records are actually kept
    fn is_enabled(&self) -> bool {
        true
    }
}
