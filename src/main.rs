// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Merge them with the optional config file and validate
// 3. Run the crawl (Ctrl-C ends it after the current page)
// 4. Write the sitemap, print the report
// 5. Exit with proper code (0 = success, 1 = some pages failed, 2 = error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod fetch;
mod logging;
mod sitemap;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, CrawlArgs};
use config::CrawlConfig;
use crawl::{CrawlOutcome, Crawler, Frontier};
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every visited page was fetched
//   Ok(1) = the crawl finished but some pages failed to fetch
//   Err   = configuration, logging or sitemap error
// A second Ctrl-C exits straight away with code 130.
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
    }
}

async fn handle_crawl(args: CrawlArgs) -> Result<i32> {
    logging::init(args.log_file.as_deref())?;
    let config = CrawlConfig::from_args(&args)?;

    tracing::info!(
        max_pages = ?config.max_pages,
        crawl_rate_secs = config.crawl_rate.as_secs_f64(),
        include_ssl = config.include_ssl,
        filter = ?config.filter.as_ref().map(|f| f.as_str()),
        "Crawling {}",
        config.seed
    );

    let frontier = Frontier::new(&config.seed, config.frontier_options());
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let crawler = Crawler::new(frontier, fetcher, config.crawl_settings());

    let stop = crawler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Ctrl-C received, stopping after the current page (press again to quit now)");
        stop.stop();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted");
            std::process::exit(130);
        }
    });

    let outcome = crawler.run().await;

    if let Some(path) = &config.generate_sitemap {
        sitemap::write_sitemap(path, &outcome.sitemap_entries())?;
    }

    print_results(&outcome, args.json)?;

    if outcome.has_failures() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Prints the report either as a table or JSON
fn print_results(outcome: &CrawlOutcome, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(outcome)?;
        println!("{}", json_output);
    } else {
        print_table(outcome);
    }
    Ok(())
}

fn print_table(outcome: &CrawlOutcome) {
    println!("{:<60} {:<10} {:<40}", "URL", "STATUS", "FOUND ON");
    println!("{}", "=".repeat(110));

    for entry in &outcome.visited {
        let status = if outcome.bad_uris.iter().any(|bad| bad == entry.url()) {
            "FAILED"
        } else {
            "OK"
        };
        println!(
            "{:<60} {:<10} {:<40}",
            truncate(entry.url(), 57),
            status,
            truncate(entry.parent_url().unwrap_or("root"), 37)
        );
    }

    println!();
    println!("Summary:");
    println!("   Visited: {}", outcome.stats.pages_visited);
    println!("   Failed: {}", outcome.stats.pages_failed);
    println!("   Links seen: {}", outcome.stats.links_seen);
    println!("   Links queued: {}", outcome.stats.links_queued);
    println!("   Duration: {:.2}s", outcome.stats.duration_secs);
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
