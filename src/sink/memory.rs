//! In-process sinks: a disabled no-op sink and an in-memory recorder

use crate::sink::traits::{Sink, SinkResult};
use crate::sink::PageRecord;
use std::sync::{Mutex, MutexGuard};

/// Sink used when no persistence is configured
///
/// Every operation succeeds and nothing is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSink;

impl Sink for DisabledSink {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn connect(&self) -> SinkResult<()> {
        Ok(())
    }

    fn insert(&self, _record: &PageRecord) -> SinkResult<()> {
        Ok(())
    }

    fn disconnect(&self) -> SinkResult<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    connected: bool,
    records: Vec<PageRecord>,
    connects: usize,
    disconnects: usize,
}

/// Sink that keeps records in memory
///
/// Follows the same connect/wipe/disconnect lifecycle as the database sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<PageRecord> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// How many times `disconnect` was called
    pub fn disconnect_count(&self) -> usize {
        self.lock().disconnects
    }

    /// How many times `connect` was called
    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn connect(&self) -> SinkResult<()> {
        let mut state = self.lock();
        state.records.clear();
        state.connected = true;
        state.connects += 1;
        Ok(())
    }

    fn insert(&self, record: &PageRecord) -> SinkResult<()> {
        let mut state = self.lock();
        if state.connected {
            state.records.push(record.clone());
        }
        Ok(())
    }

    fn disconnect(&self) -> SinkResult<()> {
        let mut state = self.lock();
        state.connected = false;
        state.disconnects += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: String::new(),
            content: String::new(),
        }
    }

    #[test]
    fn test_disabled_sink_accepts_everything() {
        let sink = DisabledSink;
        assert!(sink.connect().is_ok());
        assert!(sink.insert(&record("https://a.example/")).is_ok());
        assert!(sink.disconnect().is_ok());
        assert!(!sink.is_enabled());
    }

    #[test]
    fn test_memory_sink_lifecycle() {
        let sink = MemorySink::new();
        sink.insert(&record("https://dropped.example/")).unwrap();
        assert!(sink.is_empty());

        sink.connect().unwrap();
        sink.insert(&record("https://a.example/")).unwrap();
        assert_eq!(sink.len(), 1);

        sink.disconnect().unwrap();
        sink.insert(&record("https://late.example/")).unwrap();
        assert_eq!(sink.records(), vec![record("https://a.example/")]);
        assert_eq!(sink.disconnect_count(), 1);
    }

    #[test]
    fn test_memory_sink_connect_wipes() {
        let sink = MemorySink::new();
        sink.connect().unwrap();
        sink.insert(&record("https://a.example/")).unwrap();

        sink.connect().unwrap();
        assert!(sink.is_empty());
        assert_eq!(sink.connect_count(), 2);
    }
}
