//! Sink module for persisting page records
//!
//! This module handles:
//! - The `Sink` trait the crawler hands page records to
//! - A SQLite-backed sink with full-wipe-on-connect semantics
//! - Disabled and in-memory sinks
//! - Choosing a sink from configuration, degrading to disabled when possible

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::{DisabledSink, MemorySink};
pub use sqlite::SqliteSink;
pub use traits::{Sink, SinkError, SinkResult};

use crate::config::SinkConfig;
use std::sync::Arc;

/// One crawled page as handed to the sink
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRecord {
    pub url: String,

    /// Text of the first `<title>` element, empty if absent
    pub title: String,

    /// Capped snippet of body text
    pub content: String,
}

/// Builds and connects the sink described by the configuration
///
/// | Situation | Result |
/// |-----------|--------|
/// | no database path | `DisabledSink`, with a warning |
/// | connect fails, not required | `DisabledSink`, with a warning |
/// | connect fails, required | `Err(SinkError)` |
/// | connect succeeds | connected `SqliteSink` |
pub fn open_sink(config: &SinkConfig) -> SinkResult<Arc<dyn Sink>> {
    let Some(path) = config.database_path.as_deref() else {
        if config.required {
            return Err(SinkError::NotConfigured);
        }
        tracing::warn!("No sink database configured; page records will not be stored");
        return Ok(Arc::new(DisabledSink));
    };

    let sink = SqliteSink::new(path);
    match sink.connect() {
        Ok(()) => Ok(Arc::new(sink)),
        Err(e) if config.required => Err(e),
        Err(e) => {
            tracing::warn!("Sink unavailable ({}); continuing without storage", e);
            Ok(Arc::new(DisabledSink))
        }
    }
}
