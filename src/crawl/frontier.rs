// src/crawl/frontier.rs
// =============================================================================
// The frontier owns all crawl state:
// - a FIFO queue of discovered-but-not-yet-fetched URLs
// - the list of URLs already handed out (visited), in the order handed out
// - the admission policy (scheme, scope/filter, dedup)
//
// A URL string lives in at most one of {queue, visited}. It is only ever
// mutated through admit/process (adds to the queue) and dequeue (moves the
// queue head to visited).
//
// Rust concepts:
// - VecDeque: push_back()/pop_front() give us the FIFO discovery order
// - HashSet: O(1) "have we seen this before?" checks
// - Enums with data: Admission says exactly why a link was (not) queued
// =============================================================================

use regex::Regex;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use url::{ParseError, Url};

use super::normalize::{normalize, SslPolicy};

/// A unit of crawl work: a canonical URL and the page it was found on.
///
/// Two `CrawlUrl`s are equal when their `url`s are equal; the parent is
/// provenance only.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlUrl {
    url: String,
    parent_url: Option<String>,
}

impl CrawlUrl {
    pub fn new(url: impl Into<String>, parent_url: Option<String>) -> Self {
        Self {
            url: url.into(),
            parent_url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parent_url(&self) -> Option<&str> {
        self.parent_url.as_deref()
    }
}

impl PartialEq for CrawlUrl {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for CrawlUrl {}

impl Hash for CrawlUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// Admission settings fixed for the lifetime of one crawl.
#[derive(Debug, Clone, Default)]
pub struct FrontierOptions {
    /// When set, replaces the "starts with the seed" scope check.
    pub filter: Option<Regex>,
    pub ssl: SslPolicy,
    /// Maximum number of URLs `dequeue` will ever hand out.
    pub max_pages: Option<usize>,
}

/// Why a well-formed call to `admit` did not queue anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The normalizer returned nothing (bad syntax, relative without a
    /// parent, or a scheme we don't crawl).
    Unnormalizable,
    /// Outside the seed prefix, or not matching the filter.
    OutOfScope,
    AlreadyVisited,
    AlreadyQueued,
}

/// Something went wrong while handling one particular link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingFault {
    pub link: String,
    pub parent_url: Option<String>,
    pub reason: String,
}

/// The outcome of offering one raw link to the frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Queued under this canonical URL.
    Queued(String),
    Rejected(Rejection),
    Faulted(ProcessingFault),
}

impl Admission {
    pub fn is_queued(&self) -> bool {
        matches!(self, Admission::Queued(_))
    }
}

pub struct Frontier {
    seed: String,
    options: FrontierOptions,
    queue: VecDeque<CrawlUrl>,
    visited: Vec<CrawlUrl>,
    // Mirrors of queue/visited keyed by url for constant-time dedup
    queued: HashSet<String>,
    passed: HashSet<String>,
}

impl Frontier {
    // Creates a frontier whose queue holds only the seed
    //
    // The seed is normalized like any other link so that rediscovering it
    // later (e.g. "http://ex.com" vs "http://ex.com/") is caught by dedup.
    // A seed the normalizer refuses is kept verbatim.
    pub fn new(seed: &str, options: FrontierOptions) -> Self {
        let seed = normalize(seed, None, options.ssl).unwrap_or_else(|| seed.to_string());

        let mut queue = VecDeque::new();
        queue.push_back(CrawlUrl::new(seed.clone(), None));

        let mut queued = HashSet::new();
        queued.insert(seed.clone());

        Self {
            seed,
            options,
            queue,
            visited: Vec::new(),
            queued,
            passed: HashSet::new(),
        }
    }

    /// The (normalized) seed URL this crawl started from.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Offers a raw link found on `parent_url` and reports what happened.
    pub fn admit(&mut self, raw_link: &str, parent_url: Option<&str>) -> Admission {
        // A relative link is resolved against its parent; a parent that doesn't
        // parse is a fault for that link only.
        let needs_parent = !raw_link.is_empty()
            && matches!(Url::parse(raw_link), Err(ParseError::RelativeUrlWithoutBase));
        if let (true, Some(parent)) = (needs_parent, parent_url) {
            if let Err(e) = Url::parse(parent) {
                let fault = ProcessingFault {
                    link: raw_link.to_string(),
                    parent_url: Some(parent.to_string()),
                    reason: format!("parent url does not parse: {e}"),
                };
                tracing::warn!(
                    "Error while processing uri='{}', parent_uri='{}' (SKIPPING): {}",
                    raw_link,
                    parent,
                    fault.reason
                );
                return Admission::Faulted(fault);
            }
        }

        let Some(url) = normalize(raw_link, parent_url, self.options.ssl) else {
            return Admission::Rejected(Rejection::Unnormalizable);
        };

        if !self.in_scope(&url) {
            return Admission::Rejected(Rejection::OutOfScope);
        }
        if self.passed.contains(&url) {
            return Admission::Rejected(Rejection::AlreadyVisited);
        }
        if self.queued.contains(&url) {
            return Admission::Rejected(Rejection::AlreadyQueued);
        }

        if url.starts_with("https") {
            tracing::debug!(secure = true, "- queueing {}", url);
        } else {
            tracing::debug!("- queueing {}", url);
        }

        self.queued.insert(url.clone());
        self.queue
            .push_back(CrawlUrl::new(url.clone(), parent_url.map(str::to_string)));
        Admission::Queued(url)
    }

    /// Returns true if the link was added to the queue.
    pub fn process(&mut self, raw_link: &str, parent_url: Option<&str>) -> bool {
        self.admit(raw_link, parent_url).is_queued()
    }

    /// Hands out the next URL to fetch, or None when the crawl is over.
    ///
    /// The crawl is over when the page budget has been spent (even if URLs
    /// are still queued) or when the queue is empty.
    pub fn dequeue(&mut self) -> Option<CrawlUrl> {
        if let Some(max_pages) = self.options.max_pages {
            if self.visited.len() >= max_pages {
                return None;
            }
        }

        let next = self.queue.pop_front()?;
        self.queued.remove(next.url());
        self.passed.insert(next.url().to_string());
        self.visited.push(next.clone());
        Some(next)
    }

    /// Number of URLs still waiting in the queue.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// Every URL handed out so far, in dequeue order.
    pub fn visited(&self) -> &[CrawlUrl] {
        &self.visited
    }

    pub fn into_visited(self) -> Vec<CrawlUrl> {
        self.visited
    }

    fn in_scope(&self, url: &str) -> bool {
        match &self.options.filter {
            Some(filter) => filter.is_match(url),
            None => url.starts_with(&self.seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier(seed: &str) -> Frontier {
        Frontier::new(seed, FrontierOptions::default())
    }

    #[test]
    fn test_seed_is_the_only_initial_entry() {
        let mut f = frontier("http://ex.com/");
        assert_eq!(f.count(), 1);

        let seed = f.dequeue().expect("seed queued");
        assert_eq!(seed.url(), "http://ex.com/");
        assert_eq!(seed.parent_url(), None);
        assert_eq!(f.count(), 0);
        assert!(f.dequeue().is_none());
        assert_eq!(f.visited().len(), 1);
    }

    #[test]
    fn test_seed_without_trailing_slash_is_normalized() {
        let mut f = frontier("http://ex.com");
        assert_eq!(f.seed(), "http://ex.com/");
        f.dequeue();
        assert_eq!(
            f.admit("/", Some("http://ex.com/")),
            Admission::Rejected(Rejection::AlreadyVisited)
        );
    }

    #[test]
    fn test_relative_link_is_queued_with_parent() {
        let mut f = frontier("http://ex.com/");
        let seed = f.dequeue().unwrap();

        assert_eq!(
            f.admit("/a", Some(seed.url())),
            Admission::Queued("http://ex.com/a".to_string())
        );

        let next = f.dequeue().unwrap();
        assert_eq!(next.url(), "http://ex.com/a");
        assert_eq!(next.parent_url(), Some("http://ex.com/"));
    }

    #[test]
    fn test_same_url_from_two_parents_is_queued_once() {
        let mut f = frontier("http://ex.com/");
        f.dequeue();

        assert!(f.process("http://ex.com/b", Some("http://ex.com/")));
        let queued = f.count();
        let visited = f.visited().len();

        assert_eq!(
            f.admit("http://ex.com/b", Some("http://ex.com/other")),
            Admission::Rejected(Rejection::AlreadyQueued)
        );
        assert_eq!(f.count(), queued);
        assert_eq!(f.visited().len(), visited);
    }

    #[test]
    fn test_visited_url_is_never_requeued() {
        let mut f = frontier("http://ex.com/");
        f.process("/a", Some("http://ex.com/"));
        f.dequeue();
        f.dequeue();

        assert_eq!(
            f.admit("/a", Some("http://ex.com/x")),
            Admission::Rejected(Rejection::AlreadyVisited)
        );
        assert_eq!(f.count(), 0);
    }

    #[test]
    fn test_page_links_to_itself() {
        let mut f = frontier("http://ex.com/");
        let seed = f.dequeue().unwrap();

        assert!(!f.process(seed.url(), Some(seed.url())));
        assert!(!f.process("#top", Some(seed.url())));
        assert_eq!(f.count(), 0);
    }

    #[test]
    fn test_other_host_is_out_of_scope() {
        let mut f = frontier("http://ex.com/");
        assert_eq!(
            f.admit("http://other.com/c", Some("http://ex.com/")),
            Admission::Rejected(Rejection::OutOfScope)
        );
    }

    #[test]
    fn test_https_rejected_without_ssl() {
        let mut f = frontier("http://ex.com/");
        assert_eq!(
            f.admit("https://ex.com/d", Some("http://ex.com/")),
            Admission::Rejected(Rejection::Unnormalizable)
        );
    }

    #[test]
    fn test_filter_replaces_seed_prefix() {
        let options = FrontierOptions {
            filter: Some(Regex::new(r"^https?://(www\.)?ex\.com/blog/").unwrap()),
            ssl: SslPolicy::Include,
            max_pages: None,
        };
        let mut f = Frontier::new("http://ex.com/", options);

        assert!(f.process("https://www.ex.com/blog/post-1", Some("http://ex.com/")));
        assert!(!f.process("http://ex.com/about", Some("http://ex.com/")));
    }

    #[test]
    fn test_budget_stops_dequeue_with_work_left() {
        let options = FrontierOptions {
            max_pages: Some(2),
            ..FrontierOptions::default()
        };
        let mut f = Frontier::new("http://ex.com/", options);
        for link in ["/a", "/b", "/c"] {
            assert!(f.process(link, Some("http://ex.com/")));
        }

        assert!(f.dequeue().is_some());
        assert!(f.dequeue().is_some());
        assert!(f.dequeue().is_none());
        assert_eq!(f.visited().len(), 2);
        assert_eq!(f.count(), 2);
    }

    #[test]
    fn test_bad_parent_is_a_fault_not_a_rejection() {
        let mut f = frontier("http://ex.com/");
        match f.admit("/a", Some("::not a url::")) {
            Admission::Faulted(fault) => {
                assert_eq!(fault.link, "/a");
                assert_eq!(fault.parent_url.as_deref(), Some("::not a url::"));
            }
            other => panic!("expected fault, got {other:?}"),
        }
        assert_eq!(f.count(), 1);
    }

    #[test]
    fn test_absolute_link_does_not_need_a_parent() {
        let mut f = frontier("http://ex.com/");
        assert_eq!(
            f.admit("http://ex.com/b", Some("::not a url::")),
            Admission::Queued("http://ex.com/b".to_string())
        );
    }

    #[test]
    fn test_crawl_url_equality_ignores_parent() {
        let a = CrawlUrl::new("http://ex.com/a", None);
        let b = CrawlUrl::new("http://ex.com/a", Some("http://ex.com/".to_string()));
        assert_eq!(a, b);
        assert_ne!(a, CrawlUrl::new("http://ex.com/b", None));
    }
}
