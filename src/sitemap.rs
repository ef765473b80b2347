// src/sitemap.rs
// =============================================================================
// Writes the pages we successfully crawled as a gzip-compressed sitemap
// (https://www.sitemaps.org/protocol.html).
//
// Every entry gets:
// - <loc>        the crawled URL (XML-escaped)
// - <lastmod>    the time the sitemap was generated, in UTC
// - <changefreq> always "weekly"
// =============================================================================

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use quick_xml::escape::escape;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::crawl::CrawlUrl;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGE_FREQUENCY: &str = "weekly";

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to write sitemap to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Renders the sitemap document; entries with an empty url are skipped.
pub fn render_sitemap(urls: &[CrawlUrl], generated_at: DateTime<Utc>) -> String {
    let lastmod = generated_at.format("%Y-%m-%dT%H:%M:%S+00:00").to_string();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NAMESPACE));

    for entry in urls.iter().filter(|entry| !entry.url().is_empty()) {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(entry.url())));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            CHANGE_FREQUENCY
        ));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

// Writes the gzip-compressed sitemap to `destination`, replacing any
// existing file
//
// Returns: the number of <url> entries written
pub fn write_sitemap(destination: &Path, urls: &[CrawlUrl]) -> Result<usize, SitemapError> {
    let xml = render_sitemap(urls, Utc::now());
    let written = urls.iter().filter(|entry| !entry.url().is_empty()).count();

    let io_error = |source| SitemapError::Io {
        path: destination.to_path_buf(),
        source,
    };

    let file = File::create(destination).map_err(io_error)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(xml.as_bytes()).map_err(io_error)?;
    encoder.finish().map_err(io_error)?;

    tracing::info!(
        "Wrote sitemap with {} entries to {}",
        written,
        destination.display()
    );
    Ok(written)
}
