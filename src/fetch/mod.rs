// src/fetch/mod.rs
// =============================================================================
// This module is the crawler's window onto the network: given a page URL it
// returns the raw href values found on that page.
//
// Submodules:
// - http: Downloads pages with reqwest
// - html: Pulls <a href> values out of the downloaded HTML
//
// The crawl loop only knows about the LinkFetcher trait, so tests can swap in
// a scripted fetcher and never touch the network.
// =============================================================================

mod html;
mod http;

pub use html::extract_hrefs;
pub use http::HttpFetcher;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a page's links could not be collected.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no response from {url} within {timeout:?}")]
    Timeout { url: String, timeout: Duration },
}

impl FetchError {
    /// Short name of the failure, logged next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Client(_) => "client",
            FetchError::Request { .. } => "request",
            FetchError::Status { .. } => "status",
            FetchError::Timeout { .. } => "timeout",
        }
    }
}

/// Anything that can turn a page URL into the links on that page.
///
/// `Ok(vec![])` means the page had no links; `Err` means the page itself
/// could not be fetched or read. Implementations must report network
/// problems through `Err`, never by panicking.
#[async_trait]
pub trait LinkFetcher: Send + Sync {
    async fn fetch_links(&self, url: &str) -> Result<Vec<String>, FetchError>;
}
