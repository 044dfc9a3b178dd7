//! # note_article_crawler
//!
//! Crawls note.com listing pages, extracts structured article records from
//! each article page, keeps the AI-related ones, and writes them to CSV and
//! JSON.
//!
//! ## Usage
//!
//! ```sh
//! note_article_crawler -k AI -p 5 -o ./output
//! ```
//!
//! ## Architecture
//!
//! 1. **Harvesting**: walk search (or hashtag) pages and collect unique article URLs
//! 2. **Fetching**: download each article page, with a randomized pause between requests
//! 3. **Extraction**: run the per-field fallback chains against the page
//! 4. **Filtering**: keep records matching the keyword vocabulary (and date, if enabled)
//! 5. **Output**: write one CSV and one JSON file named after the run timestamp

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dom;
mod error;
mod extraction;
mod fetcher;
mod filters;
mod models;
mod outputs;
mod scrapers;
mod session;
mod utils;

use cli::Cli;
use config::CrawlConfig;
use dom::Document;
use extraction::{ExtractionContext, inspect_fields};
use fetcher::{DocumentFetcher, HttpFetcher, PoliteFetcher};
use session::CrawlSession;
use utils::{ensure_writable_dir, run_timestamp};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("note_article_crawler starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let base_config = match &args.config {
        Some(path) => CrawlConfig::from_yaml_file(path)?,
        None => CrawlConfig::default(),
    };
    let config = args.apply(base_config);
    config.validate()?;
    info!(
        keyword = %config.search_keyword,
        source = ?config.source,
        max_pages = config.max_pages,
        date_filter = config.date_filter,
        concurrency = config.detail_concurrency,
        "Crawl configuration ready"
    );

    let http = HttpFetcher::new(&config)?;

    if let Some(url) = &args.inspect {
        inspect(&http, url).await?;
        return Ok(());
    }

    // Early check: the run must be able to write its results
    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let timestamp = run_timestamp(Local::now());
    let output_dir = config.output_dir.clone();
    let search_fetcher = PoliteFetcher::new(http.clone(), config.search_delay()?);
    let detail_fetcher = PoliteFetcher::new(http, config.detail_delay()?);

    let records = CrawlSession::new(config)
        .run(&search_fetcher, &detail_fetcher)
        .await?;
    info!(count = records.len(), "Records after filtering");

    let paths = outputs::write_all(&records, Path::new(&output_dir), &timestamp).await?;
    info!(csv = %paths.csv.display(), json = %paths.json.display(), "Results saved");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Fetch one article and log what each extraction strategy finds on it.
#[instrument(level = "info", skip(fetcher))]
async fn inspect<F: DocumentFetcher>(fetcher: &F, url: &str) -> Result<(), Box<dyn Error>> {
    let body = fetcher.fetch(url).await?;
    let document = Document::parse(&body);
    let ctx = ExtractionContext {
        document: &document,
        url,
        seed_title: None,
    };
    inspect_fields(&ctx);
    Ok(())
}
