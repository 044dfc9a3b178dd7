//! One crawl run, from listing pages to filtered records.
//!
//! [`CrawlSession`] owns all state that grows during a run: the ordered
//! record list and the set of URLs already harvested. Harvesting completes
//! before any detail page is requested, so the dedup set is final by the time
//! detail fetches fan out.

use crate::config::CrawlConfig;
use crate::dom::Document;
use crate::error::ConfigError;
use crate::fetcher::DocumentFetcher;
use crate::filters::{DateWindowFilter, FilterSet, KeywordFilter};
use crate::models::ArticleRecord;
use crate::scrapers::details::fetch_details;
use crate::scrapers::harvest::harvest_links;
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};

pub struct CrawlSession {
    config: CrawlConfig,
    records: Vec<ArticleRecord>,
    seen: HashSet<String>,
}

impl CrawlSession {
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    /// Walk listing pages until `max_pages` or the first page with no anchors.
    ///
    /// A listing page that fails to fetch is logged and skipped.
    #[instrument(level = "info", skip_all, fields(keyword = %self.config.search_keyword, source = ?self.config.source))]
    pub async fn harvest<F>(&mut self, fetcher: &F) -> Result<usize, ConfigError>
    where
        F: DocumentFetcher,
    {
        let base = self.config.base()?;
        for page in 1..=self.config.max_pages {
            let listing_url = self.config.listing_url(page)?;
            let body = match fetcher.fetch(listing_url.as_str()).await {
                Ok(body) => body,
                Err(e) => {
                    error!(page, error = %e, "Listing page fetch failed; continuing");
                    continue;
                }
            };

            let harvest = {
                let document = Document::parse(&body);
                harvest_links(&document, &base, &self.seen)
            };
            if harvest.is_exhausted() {
                info!(page, "No article links on page; stopping harvest");
                break;
            }

            let new = harvest.candidates.len();
            for candidate in harvest.candidates {
                self.seen.insert(candidate.url.clone());
                self.records.push(ArticleRecord::from_candidate(candidate));
            }
            info!(page, new, total = self.records.len(), "Harvested listing page");
        }

        info!(total = self.records.len(), "Harvest complete");
        Ok(self.records.len())
    }

    /// Replace every harvested record with its fetched-and-extracted form.
    pub async fn collect_details<F>(&mut self, fetcher: &F)
    where
        F: DocumentFetcher,
    {
        if self.records.is_empty() {
            warn!("No candidates harvested; skipping detail fetch");
            return;
        }
        let records = std::mem::take(&mut self.records);
        self.records = fetch_details(records, fetcher, self.config.detail_concurrency).await;
    }

    /// Filters configured for this run: keywords always, the date window on request.
    pub fn filters(&self) -> FilterSet {
        let mut filters = FilterSet::new().with(KeywordFilter::new(&self.config.keywords));
        if self.config.date_filter {
            let target = self.config.effective_target_date();
            info!(%target, "Date filter enabled");
            filters = filters.with(DateWindowFilter::new(target));
        }
        filters
    }

    /// Apply the filters and hand back the final records.
    pub fn finish(self) -> Vec<ArticleRecord> {
        let filters = self.filters();
        filters.apply(self.records)
    }

    /// Harvest, fetch details and filter in one go.
    pub async fn run<S, D>(mut self, search: &S, detail: &D) -> Result<Vec<ArticleRecord>, ConfigError>
    where
        S: DocumentFetcher,
        D: DocumentFetcher,
    {
        self.harvest(search).await?;
        self.collect_details(detail).await;
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl DocumentFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Network {
                url: url.to_string(),
                detail: "connection refused".to_string(),
            })
        }
    }

    fn config() -> CrawlConfig {
        CrawlConfig {
            max_pages: 3,
            search_delay_min_secs: 0.0,
            search_delay_max_secs: 0.0,
            detail_delay_min_secs: 0.0,
            detail_delay_max_secs: 0.0,
            ..CrawlConfig::default()
        }
    }

    const PAGE_1: &str = "https://note.com/search?q=AI&page=1";
    const PAGE_2: &str = "https://note.com/search?q=AI&page=2";
    const PAGE_3: &str = "https://note.com/search?q=AI&page=3";

    #[tokio::test]
    async fn test_harvest_dedups_across_pages_and_stops_on_empty_page() {
        let fetcher = StubFetcher::default()
            .page(
                PAGE_1,
                r#"<a class="a-link" href="/a/n/1">1</a><a class="a-link" href="/a/n/2">2</a>"#,
            )
            .page(
                PAGE_2,
                r#"<a class="a-link" href="/a/n/2">2</a><a class="a-link" href="/a/n/3">3</a>"#,
            )
            .page(PAGE_3, "<div>no results</div>");

        let mut session = CrawlSession::new(CrawlConfig {
            max_pages: 10,
            ..config()
        });
        let total = session.harvest(&fetcher).await.unwrap();
        assert_eq!(total, 3);

        let urls: Vec<&str> = session.records().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://note.com/a/n/1", "https://note.com/a/n/2", "https://note.com/a/n/3"]
        );
        assert_eq!(fetcher.requested.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_listing_page_is_skipped() {
        let fetcher = StubFetcher::default()
            .page(PAGE_2, r#"<a class="a-link" href="/a/n/9">9</a>"#)
            .page(PAGE_3, "<div></div>");
        let mut session = CrawlSession::new(config());
        assert_eq!(session.harvest(&fetcher).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_emits_one_record_per_url_even_when_details_fail() {
        let search = StubFetcher::default().page(
            PAGE_1,
            r#"<a class="a-link" href="/a/n/1"><h3>AI one</h3></a>
               <a class="a-link" href="/a/n/1"><h3>AI dup</h3></a>
               <a class="a-link" href="/a/n/2"><h3>AI two</h3></a>"#,
        );
        let detail = StubFetcher::default();

        let records = CrawlSession::new(CrawlConfig {
            max_pages: 1,
            ..config()
        })
        .run(&search, &detail)
        .await
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "AI one");
        assert_eq!(records[1].title, "AI two");
        let unique: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(unique.len(), records.len());
    }

    #[tokio::test]
    async fn test_run_applies_keyword_and_date_filters() {
        let search = StubFetcher::default().page(
            PAGE_1,
            r#"<a class="a-link" href="/a/n/1">x</a><a class="a-link" href="/a/n/2">y</a><a class="a-link" href="/a/n/3">z</a>"#,
        );
        let detail = StubFetcher::default()
            .page(
                "https://note.com/a/n/1",
                r#"<h1>料理</h1><time datetime="2024-01-01T10:00:00Z"></time><article><p>ChatGPTで献立</p></article>"#,
            )
            .page(
                "https://note.com/a/n/2",
                r#"<h1>旅行記</h1><time datetime="2024-01-01T10:00:00Z"></time>"#,
            )
            .page(
                "https://note.com/a/n/3",
                r#"<h1>LLM入門</h1><time datetime="2024-01-02T10:00:00Z"></time>"#,
            );

        let records = CrawlSession::new(CrawlConfig {
            max_pages: 1,
            date_filter: true,
            target_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..config()
        })
        .run(&search, &detail)
        .await
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://note.com/a/n/1");
    }
}
