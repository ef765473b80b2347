// src/crawl/mod.rs
// =============================================================================
// This module is the core of the crawler.
//
// Submodules (leaf first):
// - normalize: raw link + parent page -> canonical URL (or nothing)
// - frontier: the queue of pages to visit, what was visited, and the rules
//   for letting a new URL in
// - crawler: the loop that drains the frontier through a page fetcher
// =============================================================================

mod crawler;
mod frontier;
mod normalize;

pub use crawler::{CrawlOutcome, CrawlSettings, Crawler};
pub use frontier::{CrawlUrl, Frontier, FrontierOptions};
pub use normalize::SslPolicy;
