//! Visited-set bookkeeping and URL fingerprints
//!
//! URLs are deduplicated by a 64-bit FNV-1a fingerprint rather than by the full string.
//! Two distinct URLs that collide are treated as the same page.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Computes the 64-bit FNV-1a fingerprint of a URL
pub fn fingerprint(url: &str) -> u64 {
    url.as_bytes().iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Default)]
struct Inner {
    seen: HashSet<u64>,
    count: usize,
}

/// Set of URLs the crawler has already dequeued for fetching
///
/// One lock guards both the membership set and the counter, so an `add` that has returned is
/// visible to every later `contains` from any task. Membership is monotone.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<Inner>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL as visited
    ///
    /// # Returns
    ///
    /// `true` if the URL was not yet a member. Adding a member again leaves the count untouched.
    pub fn add(&self, url: &str) -> bool {
        let mut inner = self.lock();
        let inserted = inner.seen.insert(fingerprint(url));
        if inserted {
            inner.count += 1;
        }
        inserted
    }

    /// Returns true if the URL (or a colliding one) has been visited
    pub fn contains(&self, url: &str) -> bool {
        self.lock().seen.contains(&fingerprint(url))
    }

    /// Number of distinct visited fingerprints
    pub fn len(&self) -> usize {
        self.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the set half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
