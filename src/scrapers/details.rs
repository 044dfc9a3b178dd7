//! Detail-page aggregation.
//!
//! Each harvested record is fetched once, every field chain is run against the
//! parsed page, and the result is merged into the record. Records whose URL is
//! known to be invalid, or whose fetch fails, are emitted in degraded form so
//! that every harvested URL still yields exactly one output row.

use crate::extraction::extract_from_html;
use crate::fetcher::DocumentFetcher;
use crate::models::{ArticleRecord, TITLE_FETCH_ERROR, TITLE_INVALID_URL};
use crate::scrapers::harvest::is_excluded;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

/// Fetch and extract every record.
///
/// With `concurrency <= 1` records are processed strictly one after another.
/// Larger values fan out detail fetches; output order always matches input
/// order.
#[instrument(level = "info", skip_all, fields(count = records.len(), concurrency = concurrency))]
pub async fn fetch_details<F>(
    records: Vec<ArticleRecord>,
    fetcher: &F,
    concurrency: usize,
) -> Vec<ArticleRecord>
where
    F: DocumentFetcher,
{
    let total = records.len();
    let articles: Vec<ArticleRecord> = stream::iter(records.into_iter().enumerate())
        .map(|(i, record)| async move {
            debug!(index = i, total, url = %record.url, "Processing article");
            fetch_detail(record, fetcher).await
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    info!(count = articles.len(), "Fetched article details");
    articles
}

/// Resolve one record: short-circuit, fetch failure, or full extraction.
#[instrument(level = "info", skip_all, fields(url = %record.url))]
pub async fn fetch_detail<F>(record: ArticleRecord, fetcher: &F) -> ArticleRecord
where
    F: DocumentFetcher,
{
    if is_excluded(&record.url) {
        warn!("Invalid article URL; not fetching");
        return record.degrade(
            TITLE_INVALID_URL,
            "Invalid URL; article details were not retrieved".to_string(),
        );
    }

    let body = match fetcher.fetch(&record.url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Detail fetch failed; emitting degraded record");
            return record.degrade(TITLE_FETCH_ERROR, format!("Details unavailable due to fetch error: {e}"));
        }
    };

    let fields = extract_from_html(&body, &record.url, record.seed_title());
    debug!(
        title = %truncate_for_log(&fields.title, 80),
        author = %fields.author,
        likes = %fields.like_count,
        tags = fields.tags.len(),
        "Extracted article fields"
    );
    record.merge(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::{AUTHOR_UNKNOWN, Candidate};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory pages; unknown URLs answer 404. Records every requested URL.
    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl DocumentFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn record(url: &str, hint: &str) -> ArticleRecord {
        ArticleRecord::from_candidate(Candidate {
            url: url.to_string(),
            title_hint: hint.to_string(),
        })
    }

    #[tokio::test]
    async fn test_successful_fetch_merges_fields() {
        let url = "https://note.com/alice/n/n1";
        let fetcher = StubFetcher::default().with_page(
            url,
            r#"<html><head><meta property="og:title" content="Hello | note"></head>
               <body><time datetime="2024-01-01T10:00:00Z"></time>
               <a href="/hashtag/AI">#AI</a><article><p>Body</p></article></body></html>"#,
        );
        let out = fetch_detail(record(url, "seed"), &fetcher).await;
        assert_eq!(out.title, "Hello");
        assert_eq!(out.author, "alice");
        assert_eq!(out.published_date.as_deref(), Some("2024-01-01T10:00:00Z"));
        assert_eq!(out.tags, vec!["#AI"]);
        assert_eq!(out.content_preview, "Body");
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_once() {
        let fetcher = StubFetcher::default();
        let out = fetch_detail(record("https://note.com/alice/n/gone", "Seed"), &fetcher).await;
        assert_eq!(out.title, "Seed");
        assert_eq!(out.author, AUTHOR_UNKNOWN);
        assert_eq!(out.like_count, "0");
        assert!(out.content_preview.contains("HTTP 404"));
        assert_eq!(fetcher.requested.borrow().len(), 1);

        let bare = fetch_detail(record("https://note.com/alice/n/gone2", ""), &fetcher).await;
        assert_eq!(bare.title, TITLE_FETCH_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_url_skips_network() {
        let fetcher = StubFetcher::default();
        let out = fetch_detail(record("https://help-note.com/hc/ja", ""), &fetcher).await;
        assert_eq!(out.title, TITLE_INVALID_URL);
        assert!(fetcher.requested.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_details_preserves_order_with_fanout() {
        let fetcher = StubFetcher::default()
            .with_page("https://note.com/a/n/1", "<h1>One</h1>")
            .with_page("https://note.com/a/n/2", "<h1>Two</h1>")
            .with_page("https://note.com/a/n/3", "<h1>Three</h1>");
        let records = vec![
            record("https://note.com/a/n/1", ""),
            record("https://note.com/a/n/2", ""),
            record("https://note.com/a/n/3", ""),
        ];
        let out = fetch_details(records, &fetcher, 3).await;
        let titles: Vec<&str> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }
}
