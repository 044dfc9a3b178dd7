//! Crawl configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then any
//! flag given explicitly on the command line (see [`crate::cli::Cli::apply`]).
//!
//! ```yaml
//! search_keyword: 生成AI
//! source: hashtag
//! max_pages: 3
//! detail_delay_min_secs: 2.5
//! detail_delay_max_secs: 5.0
//! date_filter: true
//! target_date: 2024-01-01
//! ```

use crate::error::ConfigError;
use crate::fetcher::DelayBounds;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

/// Default AI-topic vocabulary for the keyword filter.
pub const AI_KEYWORDS: [&str; 15] = [
    "AI",
    "人工知能",
    "機械学習",
    "ディープラーニング",
    "ChatGPT",
    "GPT",
    "生成AI",
    "強化学習",
    "自然言語処理",
    "NLP",
    "OpenAI",
    "Claude",
    "Gemini",
    "LLM",
    "大規模言語モデル",
];

/// Which listing the harvester walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// `/search?q=<keyword>&page=<n>`
    Search,
    /// `/hashtag/<keyword>?f=new&paid_only=false&page=<n>`
    Hashtag,
}

/// All knobs for one crawl run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub search_keyword: String,
    pub source: SearchSource,
    pub max_pages: u32,
    pub output_dir: String,
    pub base_url: String,
    pub search_delay_min_secs: f64,
    pub search_delay_max_secs: f64,
    pub detail_delay_min_secs: f64,
    pub detail_delay_max_secs: f64,
    pub date_filter: bool,
    /// Day kept by the date filter; today when unset.
    pub target_date: Option<NaiveDate>,
    pub keywords: Vec<String>,
    /// Parallel detail fetches; 1 keeps the crawl strictly sequential.
    pub detail_concurrency: usize,
    pub user_agent: String,
    pub accept_language: String,
    pub request_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            search_keyword: "AI".to_string(),
            source: SearchSource::Search,
            max_pages: 5,
            output_dir: "output".to_string(),
            base_url: "https://note.com".to_string(),
            search_delay_min_secs: 1.0,
            search_delay_max_secs: 3.0,
            detail_delay_min_secs: 2.0,
            detail_delay_max_secs: 4.0,
            date_filter: false,
            target_date: None,
            keywords: AI_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            detail_concurrency: 1,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            accept_language: "ja,en-US;q=0.9,en;q=0.8".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl CrawlConfig {
    /// Load a YAML file; keys missing from the file keep their defaults.
    #[instrument(level = "info")]
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })?;
        info!(path, "Loaded crawl configuration");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Reject settings the crawl cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base()?;
        self.search_delay()?;
        self.detail_delay()?;
        Ok(())
    }

    pub fn base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|_| ConfigError::BaseUrl(self.base_url.clone()))
    }

    pub fn search_delay(&self) -> Result<DelayBounds, ConfigError> {
        DelayBounds::from_secs("search", self.search_delay_min_secs, self.search_delay_max_secs)
    }

    pub fn detail_delay(&self) -> Result<DelayBounds, ConfigError> {
        DelayBounds::from_secs("detail", self.detail_delay_min_secs, self.detail_delay_max_secs)
    }

    /// Day used by the date filter.
    pub fn effective_target_date(&self) -> NaiveDate {
        self.target_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// URL of listing page `page` (1-based) for the configured source.
    pub fn listing_url(&self, page: u32) -> Result<Url, ConfigError> {
        let base = self.base()?;
        let page = page.to_string();
        let mut url = match self.source {
            SearchSource::Search => base.join("/search"),
            SearchSource::Hashtag => base
                .join("/hashtag/")
                .and_then(|u| u.join(&self.search_keyword.replace('/', "%2F"))),
        }
        .map_err(|_| ConfigError::BaseUrl(self.base_url.clone()))?;

        match self.source {
            SearchSource::Search => {
                url.query_pairs_mut()
                    .append_pair("q", &self.search_keyword)
                    .append_pair("page", &page);
            }
            SearchSource::Hashtag => {
                url.query_pairs_mut()
                    .append_pair("f", "new")
                    .append_pair("paid_only", "false")
                    .append_pair("page", &page);
            }
        }
        Ok(url)
    }
}
