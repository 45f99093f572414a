//! Crawl phase definitions for the coordinator state machine
//!
//! The coordinator moves through the phases strictly in order and never goes back.

use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Seed URLs are being offered to the frontier
    Seeding,

    /// Pages are being dequeued, fetched and parsed
    Running,

    /// No new work is issued; in-flight tasks are being awaited
    Draining,

    /// Stats stopped, sink disconnected, report produced
    Done,
}

impl CrawlPhase {
    /// Returns true if the coordinator may still issue new page tasks
    pub fn accepts_work(&self) -> bool {
        matches!(self, Self::Seeding | Self::Running)
    }

    /// Returns the phase that follows this one, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Seeding => Some(Self::Running),
            Self::Running => Some(Self::Draining),
            Self::Draining => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Checks if a transition from this phase to another is valid
    ///
    /// Only the single step forward is allowed.
    pub fn can_transition_to(&self, target: CrawlPhase) -> bool {
        self.next() == Some(target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
