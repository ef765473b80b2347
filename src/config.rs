// src/config.rs
// =============================================================================
// Turns command-line flags and an optional JSON config file into one
// validated CrawlConfig.
//
// Precedence: flag on the command line > value in the file > default.
//
// Everything that can be wrong with the settings is caught here, before the
// crawl starts: a bad seed, a zero page budget, a negative delay or a filter
// that isn't a valid regex.
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cli::CrawlArgs;
use crate::crawl::{CrawlSettings, FrontierOptions, SslPolicy};

pub const DEFAULT_CRAWL_RATE_SECS: f64 = 1.0;
pub const DEFAULT_FETCH_TIMEOUT_SECS: f64 = 30.0;

/// Settings as they appear in a `--config` JSON file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub seed: Option<String>,
    pub max_pages: Option<usize>,
    pub generate_sitemap: Option<PathBuf>,
    pub crawl_rate: Option<f64>,
    pub include_ssl: Option<bool>,
    pub filter: Option<String>,
    pub fetch_timeout: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Fully resolved crawl settings.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: String,
    pub max_pages: Option<usize>,
    pub generate_sitemap: Option<PathBuf>,
    pub crawl_rate: Duration,
    pub include_ssl: bool,
    pub filter: Option<Regex>,
    pub fetch_timeout: Duration,
}

impl CrawlConfig {
    // Reads the --config file (if any) and merges it with the flags
    pub fn from_args(args: &CrawlArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    pub fn merge(args: &CrawlArgs, file: FileConfig) -> Result<Self> {
        let seed = args
            .seed
            .clone()
            .or(file.seed)
            .ok_or_else(|| anyhow!("No seed URL given (pass it as an argument or set \"seed\" in --config)"))?;
        let include_ssl = args
            .include_ssl_flag()
            .or(file.include_ssl)
            .unwrap_or(false);
        validate_seed(&seed, include_ssl)?;

        let max_pages = args.max_pages.or(file.max_pages);
        if max_pages == Some(0) {
            bail!("max_pages must be at least 1");
        }

        let crawl_rate_secs = args
            .crawl_rate
            .or(file.crawl_rate)
            .unwrap_or(DEFAULT_CRAWL_RATE_SECS);
        let crawl_rate = Duration::try_from_secs_f64(crawl_rate_secs)
            .map_err(|_| anyhow!("crawl_rate must be a non-negative number of seconds, got {crawl_rate_secs}"))?;

        let fetch_timeout_secs = args
            .fetch_timeout
            .or(file.fetch_timeout)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        let fetch_timeout = Duration::try_from_secs_f64(fetch_timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| anyhow!("fetch_timeout must be a positive number of seconds, got {fetch_timeout_secs}"))?;

        let filter = args
            .filter
            .clone()
            .or(file.filter)
            .map(|pattern| {
                Regex::new(&pattern).with_context(|| format!("Invalid filter pattern '{pattern}'"))
            })
            .transpose()?;

        Ok(Self {
            seed,
            max_pages,
            generate_sitemap: args.generate_sitemap.clone().or(file.generate_sitemap),
            crawl_rate,
            include_ssl,
            filter,
            fetch_timeout,
        })
    }

    pub fn frontier_options(&self) -> FrontierOptions {
        FrontierOptions {
            filter: self.filter.clone(),
            ssl: SslPolicy::from(self.include_ssl),
            max_pages: self.max_pages,
        }
    }

    pub fn crawl_settings(&self) -> CrawlSettings {
        CrawlSettings {
            crawl_rate: self.crawl_rate,
            fetch_deadline: Some(self.fetch_timeout),
        }
    }
}

fn validate_seed(seed: &str, include_ssl: bool) -> Result<()> {
    let url = Url::parse(seed).with_context(|| format!("Invalid seed URL '{seed}'"))?;
    match url.scheme() {
        "http" => Ok(()),
        "https" => {
            if !include_ssl {
                tracing::warn!(
                    "Seed {} is https but --include-ssl is off; only the seed page will be crawled",
                    seed
                );
            }
            Ok(())
        }
        other => bail!("Seed URL must be http or https, got '{other}'"),
    }
}
