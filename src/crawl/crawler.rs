// src/crawl/crawler.rs
// =============================================================================
// The crawl loop: the state machine that binds the frontier and the fetcher.
//
// How it works:
// 1. Ask the frontier for the next URL (None = we're done)
// 2. Fetch the links on that page
// 3. Offer every link back to the frontier, with the page as parent
// 4. If the fetch failed, remember the URL as a "bad URI" instead
// 5. Log one progress line, sleep for the crawl delay, go to 1
//
// Nothing that goes wrong with a single page or a single link stops the
// crawl. It ends when the queue runs dry, the page budget is spent, or a
// stop was requested through the stop handle.
// =============================================================================

use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::Instrument;

use super::frontier::{Admission, CrawlUrl, Frontier};
use crate::fetch::{FetchError, LinkFetcher};

/// Pacing knobs for the loop itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrawlSettings {
    /// Pause after every page, whatever the fetch outcome was.
    pub crawl_rate: Duration,
    /// Upper bound on a single fetch; None trusts the fetcher's own timeout.
    pub fetch_deadline: Option<Duration>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            crawl_rate: Duration::from_secs(1),
            fetch_deadline: None,
        }
    }
}

/// Counters collected while crawling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub links_seen: usize,
    pub links_queued: usize,
    pub links_rejected: usize,
    pub processing_faults: usize,
    pub duration_secs: f64,
}

/// What a finished crawl leaves behind.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    /// Every URL handed out by the frontier, in visit order.
    pub visited: Vec<CrawlUrl>,
    /// URLs whose page could not be fetched.
    pub bad_uris: Vec<String>,
    pub stats: CrawlStats,
}

impl CrawlOutcome {
    /// Visited pages minus the bad URIs, in visit order.
    pub fn sitemap_entries(&self) -> Vec<CrawlUrl> {
        let bad: HashSet<&str> = self.bad_uris.iter().map(String::as_str).collect();
        self.visited
            .iter()
            .filter(|entry| !bad.contains(entry.url()))
            .cloned()
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.bad_uris.is_empty()
    }
}

/// Shared request to end the crawl before the next page.
///
/// Stopping also cuts short the pause between pages.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopState>,
}

#[derive(Debug, Default)]
struct StopState {
    requested: AtomicBool,
    notify: Notify,
}

impl StopHandle {
    pub fn stop(&self) {
        self.inner.requested.store(true, Ordering::Release);
        // notify_one keeps a permit when nobody is waiting yet
        self.inner.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    /// Resolves once `stop` has been called.
    pub async fn stopped(&self) {
        while !self.is_stopped() {
            self.inner.notify.notified().await;
        }
    }
}

pub struct Crawler<F> {
    frontier: Frontier,
    fetcher: F,
    settings: CrawlSettings,
    bad_uris: Vec<String>,
    stats: CrawlStats,
    stop: StopHandle,
}

impl<F: LinkFetcher> Crawler<F> {
    pub fn new(frontier: Frontier, fetcher: F, settings: CrawlSettings) -> Self {
        Self {
            frontier,
            fetcher,
            settings,
            bad_uris: Vec::new(),
            stats: CrawlStats::default(),
            stop: StopHandle::default(),
        }
    }

    /// A handle that ends the crawl before the next page.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs the crawl to completion.
    pub async fn run(mut self) -> CrawlOutcome {
        let span = tracing::info_span!("crawl", seed = %self.frontier.seed());
        let started = Instant::now();

        self.crawl_loop().instrument(span).await;

        self.stats.pages_visited = self.frontier.visited().len();
        self.stats.pages_failed = self.bad_uris.len();
        self.stats.duration_secs = started.elapsed().as_secs_f64();

        tracing::info!(
            pages_visited = self.stats.pages_visited,
            pages_failed = self.stats.pages_failed,
            links_seen = self.stats.links_seen,
            links_queued = self.stats.links_queued,
            duration_secs = self.stats.duration_secs,
            "Done."
        );

        CrawlOutcome {
            visited: self.frontier.into_visited(),
            bad_uris: self.bad_uris,
            stats: self.stats,
        }
    }

    async fn crawl_loop(&mut self) {
        loop {
            if self.stop.is_stopped() {
                tracing::info!("Stop requested, ending crawl");
                break;
            }

            let Some(current) = self.frontier.dequeue() else {
                break;
            };

            self.visit(&current).await;

            tokio::select! {
                _ = tokio::time::sleep(self.settings.crawl_rate) => {}
                _ = self.stop.stopped() => {}
            }
        }
    }

    async fn visit(&mut self, current: &CrawlUrl) {
        let url = current.url();
        let parent = current.parent_url().unwrap_or("root");

        let start = Instant::now();
        let result = self.fetch(url).await;
        let duration = start.elapsed().as_secs_f64();

        match result {
            Ok(links) => {
                for link in links {
                    self.offer(&link, url);
                }
                tracing::info!(
                    "{} - {} -> {} ({:.2} sec; queued: {})",
                    self.frontier.visited().len(),
                    parent,
                    url,
                    duration,
                    self.frontier.count()
                );
            }
            Err(e) => {
                self.bad_uris.push(url.to_string());
                tracing::warn!(
                    error_kind = e.kind(),
                    "Error fetching links of {}: {}",
                    url,
                    e
                );
                tracing::info!(
                    "{} - {} -> {} ({:.2} sec; queued: {}) [Error fetching links]",
                    self.frontier.visited().len(),
                    parent,
                    url,
                    duration,
                    self.frontier.count()
                );
            }
        }
    }

    fn offer(&mut self, link: &str, parent_url: &str) {
        self.stats.links_seen += 1;
        match self.frontier.admit(link, Some(parent_url)) {
            Admission::Queued(_) => self.stats.links_queued += 1,
            Admission::Rejected(_) => self.stats.links_rejected += 1,
            Admission::Faulted(_) => self.stats.processing_faults += 1,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError> {
        match self.settings.fetch_deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.fetcher.fetch_links(url))
                .await
                .unwrap_or_else(|_| {
                    Err(FetchError::Timeout {
                        url: url.to_string(),
                        timeout: deadline,
                    })
                }),
            None => self.fetcher.fetch_links(url).await,
        }
    }
}
