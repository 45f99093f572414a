//! Frontier queue of URLs waiting to be fetched
//!
//! This module handles:
//! - FIFO ordering of pending URLs (breadth-first crawl order)
//! - Atomic dequeue that reports emptiness instead of failing
//! - Check-and-reserve admission so a URL enters the queue at most once
//! - Enqueue/dequeue counters for the final report

use crate::state::fingerprint;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    /// Pending URLs, head is the next to fetch
    queue: VecDeque<String>,

    /// Fingerprints of every URL that was ever admitted
    reserved: HashSet<u64>,

    total_enqueued: usize,
    total_dequeued: usize,
}

/// Thread-safe FIFO of pending URLs
///
/// Every public method takes the internal lock exactly once, so each call is atomic with respect
/// to every other call. `len() == total_enqueued() - total_dequeued()` holds between calls.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<Inner>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the tail unconditionally
    ///
    /// The URL is also reserved, so a later `offer` of the same URL is refused.
    pub fn enqueue(&self, url: impl Into<String>) {
        let url = url.into();
        let mut inner = self.lock();
        inner.reserved.insert(fingerprint(&url));
        Self::push(&mut inner, url);
    }

    /// Admits a URL if it has never been admitted before
    ///
    /// Reserving the fingerprint and appending happen under one lock, so two tasks offering the
    /// same URL concurrently admit it exactly once.
    ///
    /// # Returns
    ///
    /// `true` if the URL was enqueued, `false` if it was already reserved.
    pub fn offer(&self, url: &str) -> bool {
        let mut inner = self.lock();
        if !inner.reserved.insert(fingerprint(url)) {
            return false;
        }
        Self::push(&mut inner, url.to_string());
        true
    }

    /// Removes and returns the head of the queue
    ///
    /// Returns `None` when the queue is empty.
    pub fn try_dequeue(&self) -> Option<String> {
        let mut inner = self.lock();
        let url = inner.queue.pop_front()?;
        inner.total_dequeued += 1;
        Some(url)
    }

    /// Number of URLs currently waiting
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of URLs ever appended
    pub fn total_enqueued(&self) -> usize {
        self.lock().total_enqueued
    }

    /// Number of URLs ever removed
    pub fn total_dequeued(&self) -> usize {
        self.lock().total_dequeued
    }

    fn push(inner: &mut Inner, url: String) {
        inner.queue.push_back(url);
        inner.total_enqueued += 1;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
