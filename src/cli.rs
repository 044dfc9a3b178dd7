//! Command-line interface definitions.
//!
//! Every crawl setting is optional on the command line. Flags that are given
//! override the YAML file passed with `--config`, which in turn overrides the
//! built-in defaults.

use crate::config::{CrawlConfig, SearchSource};
use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for the note.com article crawler.
///
/// # Examples
///
/// ```sh
/// # Five search pages for "AI", results in ./output
/// note_article_crawler
///
/// # Hashtag listing, only articles published on a given day
/// note_article_crawler --source hashtag -k 生成AI --date-filter --target-date 2024-01-01
///
/// # Show what every extraction strategy finds on one article
/// note_article_crawler --inspect https://note.com/goto_finance/n/n2edf753c0fe5
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML crawl configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Search keyword (or hashtag name with --source hashtag)
    #[arg(short = 'k', long = "keyword", env = "NOTE_SEARCH_KEYWORD")]
    pub search_keyword: Option<String>,

    /// Listing to harvest article links from
    #[arg(long, value_enum)]
    pub source: Option<SearchSource>,

    /// Maximum number of listing pages to request
    #[arg(short = 'p', long)]
    pub max_pages: Option<u32>,

    /// Output directory for the CSV and JSON files
    #[arg(short, long, env = "NOTE_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Base origin of the platform
    #[arg(long)]
    pub base_url: Option<String>,

    /// Minimum pause after a listing page request, in seconds
    #[arg(long)]
    pub search_delay_min: Option<f64>,

    /// Maximum pause after a listing page request, in seconds
    #[arg(long)]
    pub search_delay_max: Option<f64>,

    /// Minimum pause after an article request, in seconds
    #[arg(long)]
    pub detail_delay_min: Option<f64>,

    /// Maximum pause after an article request, in seconds
    #[arg(long)]
    pub detail_delay_max: Option<f64>,

    /// Keep only articles published on the target date
    #[arg(long)]
    pub date_filter: bool,

    /// Day kept by --date-filter (YYYY-MM-DD, default today)
    #[arg(long)]
    pub target_date: Option<NaiveDate>,

    /// Number of article pages fetched in parallel
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Fetch a single article, log every strategy's result, and exit
    #[arg(long, value_name = "URL")]
    pub inspect: Option<String>,
}

impl Cli {
    /// Overlay explicitly given flags onto `config`.
    pub fn apply(&self, mut config: CrawlConfig) -> CrawlConfig {
        if let Some(keyword) = &self.search_keyword {
            config.search_keyword = keyword.clone();
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(v) = self.search_delay_min {
            config.search_delay_min_secs = v;
        }
        if let Some(v) = self.search_delay_max {
            config.search_delay_max_secs = v;
        }
        if let Some(v) = self.detail_delay_min {
            config.detail_delay_min_secs = v;
        }
        if let Some(v) = self.detail_delay_max {
            config.detail_delay_max_secs = v;
        }
        if self.date_filter {
            config.date_filter = true;
        }
        if self.target_date.is_some() {
            config.target_date = self.target_date;
        }
        if let Some(n) = self.concurrency {
            config.detail_concurrency = n;
        }
        config
    }
}
