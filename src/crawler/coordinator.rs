//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier, visited set, fetcher, parser and
//! sink together:
//! - Seeding the frontier
//! - Dequeuing URLs and dispatching one page task per URL
//! - Bounding fetch and parse concurrency with semaphores
//! - Detecting cap and exhaustion termination
//! - Draining in-flight work before shutting the sink down
//!
//! # Concurrency model
//!
//! Every dequeued URL becomes a task in a `JoinSet`, and each task's result is routed back
//! through its own join handle. Fetches are bounded by `fetch-concurrency` permits which the
//! coordinator acquires *before* dequeuing; with the default of one permit only a single fetch
//! is ever in flight and the next dequeue waits for it. Parsing is bounded separately by
//! `parse-workers` permits and is never awaited by the loop, so parses overlap with later
//! fetches and with each other.

use crate::config::{validate, validate_crawler_config, Config, CrawlerConfig};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchError};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_page;
use crate::output::{CrawlReport, StatsCollector, StopReason};
use crate::sink::Sink;
use crate::state::{CrawlPhase, VisitedSet};
use crate::{CrawlError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// What happened to a single dequeued URL
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was fetched and parsed
    Parsed {
        url: String,
        /// Links newly admitted to the frontier
        admitted: usize,
        /// Whether the sink accepted the record
        stored: bool,
    },

    /// The fetch succeeded with an empty body; nothing to parse
    NoContent { url: String },

    /// The fetch failed and the page was skipped
    FetchFailed(FetchError),
}

/// Shared handles every page task needs
///
/// Handed to each task at spawn time; there is no global crawl state.
struct PageContext {
    frontier: Arc<Frontier>,
    visited: Arc<VisitedSet>,
    sink: Arc<dyn Sink>,
    client: Client,
    parse_permits: Arc<Semaphore>,
    snippet_cap: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    settings: CrawlerConfig,
    context: Arc<PageContext>,
    fetch_permits: Arc<Semaphore>,
    tasks: JoinSet<PageOutcome>,
    phase: CrawlPhase,
    pages_recorded: usize,
    fetch_failures: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - An already connected sink; the coordinator disconnects it when done
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - The configuration is invalid or the HTTP client could not be built
    pub fn new(config: Config, sink: Arc<dyn Sink>) -> Result<Self> {
        validate(&config)?;
        let timeout = config.crawler.fetch_timeout_secs.map(Duration::from_secs);
        let client = build_http_client(&config.user_agent, timeout)?;
        Self::with_client(config.crawler, sink, client)
    }

    /// Creates a coordinator around an existing HTTP client
    ///
    /// The crawler settings are validated, since zero permits or a zero stats interval would
    /// stall the crawl.
    pub fn with_client(
        settings: CrawlerConfig,
        sink: Arc<dyn Sink>,
        client: Client,
    ) -> Result<Self> {
        validate_crawler_config(&settings)?;

        let context = PageContext {
            frontier: Arc::new(Frontier::new()),
            visited: Arc::new(VisitedSet::new()),
            sink,
            client,
            parse_permits: Arc::new(Semaphore::new(settings.parse_workers)),
            snippet_cap: settings.snippet_cap,
        };

        Ok(Self {
            fetch_permits: Arc::new(Semaphore::new(settings.fetch_concurrency)),
            settings,
            context: Arc::new(context),
            tasks: JoinSet::new(),
            phase: CrawlPhase::Seeding,
            pages_recorded: 0,
            fetch_failures: 0,
        })
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Handle to the frontier shared with page tasks
    pub fn frontier(&self) -> Arc<Frontier> {
        Arc::clone(&self.context.frontier)
    }

    /// Handle to the visited set shared with page tasks
    pub fn visited(&self) -> Arc<VisitedSet> {
        Arc::clone(&self.context.visited)
    }

    /// Runs the crawl to completion
    ///
    /// Seeds the frontier, runs the crawl loop until the page cap is reached or the frontier is
    /// exhausted, waits for every in-flight page, then stops the stats collector and
    /// disconnects the sink.
    pub async fn run(mut self) -> Result<CrawlReport> {
        let started = Instant::now();
        let stats = StatsCollector::spawn(
            Duration::from_secs(self.settings.stats_interval_secs),
            self.visited(),
            self.frontier(),
        );

        self.seed();

        let stop_reason = match self.run_loop().await {
            Ok(reason) => reason,
            Err(e) => {
                self.tasks.abort_all();
                stats.stop().await;
                self.disconnect_sink();
                return Err(e);
            }
        };

        self.transition(CrawlPhase::Draining)?;
        self.drain().await;

        self.transition(CrawlPhase::Done)?;
        let series = stats.stop().await;
        self.disconnect_sink();

        let frontier = &self.context.frontier;
        let report = CrawlReport {
            total_enqueued: frontier.total_enqueued(),
            frontier_remaining: frontier.len(),
            visited: self.context.visited.len(),
            pages_recorded: self.pages_recorded,
            fetch_failures: self.fetch_failures,
            stop_reason,
            elapsed: started.elapsed(),
            stats: series,
        };

        tracing::info!(
            "Crawl finished ({}): {} visited, {} enqueued, {} still pending, {:?}",
            report.stop_reason,
            report.visited,
            report.total_enqueued,
            report.frontier_remaining,
            report.elapsed
        );

        Ok(report)
    }

    /// Offers every configured seed URL to the frontier
    fn seed(&mut self) {
        for seed in &self.settings.seeds {
            if self.context.frontier.offer(seed) {
                tracing::debug!("Seeded frontier with {}", seed);
            } else {
                tracing::debug!("Ignoring duplicate seed {}", seed);
            }
        }

        tracing::info!(
            "Seeded {} URLs (page cap {}, fetch concurrency {})",
            self.context.frontier.len(),
            self.settings.max_pages,
            self.settings.fetch_concurrency
        );
    }

    /// Dequeues and dispatches pages until the cap is hit or nothing is left to do
    async fn run_loop(&mut self) -> Result<StopReason> {
        self.transition(CrawlPhase::Running)?;

        loop {
            while let Some(result) = self.tasks.try_join_next() {
                self.record_outcome(result);
            }

            if self.context.visited.len() >= self.settings.max_pages {
                tracing::info!(
                    "Reached page cap of {} with {} URLs still in the frontier",
                    self.settings.max_pages,
                    self.context.frontier.len()
                );
                return Ok(StopReason::CapReached);
            }

            // Holding a permit before dequeuing keeps the number of in-flight fetches bounded
            let permit = Arc::clone(&self.fetch_permits).acquire_owned().await?;

            match self.context.frontier.try_dequeue() {
                Some(url) => {
                    if !self.context.visited.add(&url) {
                        tracing::debug!("Skipping already visited {}", url);
                        continue;
                    }
                    self.dispatch(url, permit);
                }
                None => {
                    drop(permit);

                    // A page still in flight may refill the frontier
                    match self.tasks.join_next().await {
                        Some(result) => self.record_outcome(result),
                        None => {
                            tracing::info!("Frontier exhausted");
                            return Ok(StopReason::FrontierExhausted);
                        }
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, url: String, fetch_permit: OwnedSemaphorePermit) {
        debug_assert!(self.phase.accepts_work());
        tracing::trace!("Dispatching {}", url);
        self.tasks
            .spawn(process_page(Arc::clone(&self.context), url, fetch_permit));
    }

    /// Waits for every in-flight page task
    async fn drain(&mut self) {
        if !self.tasks.is_empty() {
            tracing::info!("Waiting for {} in-flight pages", self.tasks.len());
        }

        while let Some(result) = self.tasks.join_next().await {
            self.record_outcome(result);
        }
    }

    fn record_outcome(&mut self, result: std::result::Result<PageOutcome, JoinError>) {
        match result {
            Ok(PageOutcome::Parsed {
                url,
                admitted,
                stored,
            }) => {
                tracing::debug!("{}: {} new links", url, admitted);
                if stored {
                    self.pages_recorded += 1;
                }
            }
            Ok(PageOutcome::NoContent { url }) => {
                tracing::debug!("No content at {}", url);
            }
            Ok(PageOutcome::FetchFailed(e)) => {
                self.fetch_failures += 1;
                tracing::warn!(
                    "Skipping page: {}{}",
                    e,
                    if e.is_transient() { " (transient)" } else { "" }
                );
            }
            Err(e) => {
                tracing::error!("Page task failed: {}", e);
            }
        }
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        tracing::debug!("Crawl phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    fn disconnect_sink(&self) {
        let sink = &self.context.sink;
        if let Err(e) = sink.disconnect() {
            tracing::warn!("Failed to disconnect {} sink: {}", sink.name(), e);
        }
    }
}

/// Fetches, parses and records one page
///
/// The fetch permit is released as soon as the fetch completes so the coordinator can start the
/// next one while this page is still being parsed.
async fn process_page(
    context: Arc<PageContext>,
    url: String,
    fetch_permit: OwnedSemaphorePermit,
) -> PageOutcome {
    let fetched = fetch_page(&context.client, &url).await;
    drop(fetch_permit);

    let body = match fetched {
        Ok(body) if body.is_empty() => return PageOutcome::NoContent { url },
        Ok(body) => body,
        Err(e) => return PageOutcome::FetchFailed(e),
    };

    // The parse semaphore is never closed, so acquisition only waits
    let _parse_permit = context.parse_permits.acquire().await.ok();

    let parsed = parse_page(&url, &body, context.snippet_cap);

    // The record goes out before any of its links can be dequeued
    let stored = match context.sink.insert(&parsed.record) {
        Ok(()) => context.sink.is_enabled(),
        Err(e) => {
            tracing::warn!("Failed to store {}: {}", url, e);
            false
        }
    };

    let mut admitted = 0;
    for link in &parsed.links {
        if context.visited.contains(link) {
            continue;
        }
        if context.frontier.offer(link) {
            admitted += 1;
        }
    }

    tracing::info!(
        "Count: {} | {} -> {}",
        context.visited.len(),
        url,
        parsed.record.title
    );
    tracing::trace!("{}: {} links found", url, parsed.links.len());

    PageOutcome::Parsed {
        url,
        admitted,
        stored,
    }
}

/// Runs a complete crawl against the given sink
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::Config;
/// use ripple_crawl::crawler::run_crawl;
/// use ripple_crawl::sink::DisabledSink;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default(), Arc::new(DisabledSink)).await?;
/// println!("visited {}", report.visited);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, sink: Arc<dyn Sink>) -> Result<CrawlReport> {
    Coordinator::new(config, sink)?.run().await
}
