//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedSet`: fingerprints of every URL the crawler has dequeued for fetching
//! - `CrawlPhase`: the coordinator's linear lifecycle (seeding, running, draining, done)

mod phase;
mod visited;

// Re-export main types
pub use phase::CrawlPhase;
pub use visited::{fingerprint, VisitedSet};
