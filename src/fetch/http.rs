// src/fetch/http.rs
// =============================================================================
// HTTP side of the fetcher.
//
// - One reqwest Client is built up front and reused for every page
//   (connection pooling)
// - Anything but a 2xx response counts as a failed fetch
// - The body is handed to html::extract_hrefs
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{extract_hrefs, FetchError, LinkFetcher};

const USER_AGENT: &str = concat!("sitemap-crawler/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the shared client
    //
    // Parameters:
    //   timeout: upper bound for a single request, connect through body
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    // Fetches a web page and returns its HTML content
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl LinkFetcher for HttpFetcher {
    async fn fetch_links(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let html = self.fetch_page(url).await?;
        Ok(extract_hrefs(&html))
    }
}
