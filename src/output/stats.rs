//! Periodic throughput sampling
//!
//! The collector runs as its own task on a fixed wall-clock interval and only reads the
//! frontier and visited-set sizes; it never takes part in the crawl loop.

use crate::crawler::Frontier;
use crate::state::VisitedSet;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One throughput measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSample {
    /// Minutes since the collector started
    pub elapsed_minutes: f64,

    /// Visited-set size at the tick
    pub visited: usize,

    /// Visited size divided by frontier size; `None` while the frontier is empty
    pub visited_over_frontier: Option<f64>,
}

impl StatsSample {
    /// Takes a sample of the current crawl state
    pub fn take(elapsed: Duration, visited: &VisitedSet, frontier: &Frontier) -> Self {
        let visited = visited.len();
        let pending = frontier.len();

        let visited_over_frontier = if pending == 0 {
            None
        } else {
            Some(visited as f64 / pending as f64)
        };

        Self {
            elapsed_minutes: elapsed.as_secs_f64() / 60.0,
            visited,
            visited_over_frontier,
        }
    }
}

/// Time series of samples accumulated over a crawl
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSeries {
    samples: Vec<StatsSample>,
}

impl StatsSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: StatsSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[StatsSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Visited pages per tick, one `"<minutes> <visited>"` line each, starting at the origin
    pub fn pages_series(&self) -> String {
        let mut out = String::from("0 0\n");
        for sample in &self.samples {
            let _ = writeln!(out, "{:.6} {}", sample.elapsed_minutes, sample.visited);
        }
        out
    }

    /// Visited-to-frontier ratio per tick, aligned with [`pages_series`](Self::pages_series)
    ///
    /// Ticks taken while the frontier was empty report a ratio of 0.
    pub fn ratio_series(&self) -> String {
        let mut out = String::from("0 0\n");
        for sample in &self.samples {
            let _ = writeln!(
                out,
                "{:.6} {:.6}",
                sample.elapsed_minutes,
                sample.visited_over_frontier.unwrap_or(0.0)
            );
        }
        out
    }
}

/// Handle to a running stats collector task
pub struct StatsCollector {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<StatsSeries>,
}

impl StatsCollector {
    /// Spawns the collector
    ///
    /// The first sample is taken one full `period` after the call.
    pub fn spawn(period: Duration, visited: Arc<VisitedSet>, frontier: Arc<Frontier>) -> Self {
        let (stop, mut stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let mut ticker = interval_at(start + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut series = StatsSeries::new();

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    tick = ticker.tick() => {
                        let sample = StatsSample::take(tick - start, &visited, &frontier);
                        tracing::debug!(
                            "Stats: {:.2} min, {} visited, {} pending",
                            sample.elapsed_minutes,
                            sample.visited,
                            frontier.len()
                        );
                        series.record(sample);
                    }
                }
            }

            series
        });

        Self { stop, handle }
    }

    /// Signals the collector to stop and returns everything it sampled
    pub async fn stop(self) -> StatsSeries {
        // The task may already have exited if the runtime is shutting down
        let _ = self.stop.send(());

        match self.handle.await {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!("Stats collector ended abnormally: {}", e);
                StatsSeries::new()
            }
        }
    }
}
