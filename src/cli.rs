// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every crawl setting can also come from a JSON file passed with --config;
// a flag given on the command line always wins over the file (see config.rs).
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sitemap-crawler",
    version,
    about = "Crawl a single site politely and write a sitemap of the pages reached",
    long_about = "sitemap-crawler starts from a seed URL, follows links that stay under that URL \
                  (or match --filter), waits between requests, and can write the pages it \
                  reached as a gzip-compressed sitemap."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site starting from a seed URL
    ///
    /// Example: sitemap-crawler crawl http://example.com/ --max-pages 100 --generate-sitemap sitemap.xml.gz
    Crawl(CrawlArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CrawlArgs {
    /// Seed URL the crawl starts from (may instead be set in --config)
    pub seed: Option<String>,

    /// Stop after this many pages have been visited
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Write a gzip-compressed sitemap of the crawled pages to this file
    #[arg(long, value_name = "PATH")]
    pub generate_sitemap: Option<PathBuf>,

    /// Seconds to wait between page requests (default: 1)
    #[arg(long, value_name = "SECS")]
    pub crawl_rate: Option<f64>,

    /// Also crawl https links
    #[arg(long, overrides_with = "no_include_ssl")]
    pub include_ssl: bool,

    /// Crawl http links only, even if the config file enables https
    #[arg(long, overrides_with = "include_ssl")]
    pub no_include_ssl: bool,

    /// Only follow URLs matching this regular expression
    /// (replaces the default "starts with the seed URL" rule)
    #[arg(long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Seconds before a single page request is abandoned (default: 30)
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout: Option<f64>,

    /// JSON file with crawl settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also append log lines to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the crawl report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    /// The SSL choice made on the command line, if any.
    pub fn include_ssl_flag(&self) -> Option<bool> {
        if self.include_ssl {
            Some(true)
        } else if self.no_include_ssl {
            Some(false)
        } else {
            None
        }
    }
}
