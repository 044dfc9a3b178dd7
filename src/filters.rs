//! Post-extraction record filters.
//!
//! Filters are pure predicates over a finished [`ArticleRecord`]. A
//! [`FilterSet`] keeps a record only if every filter in it does, so the order
//! filters are added in never changes the outcome.

use crate::error::DateParseError;
use crate::models::ArticleRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument};

/// A predicate deciding whether a record stays in the output.
pub trait RecordFilter {
    fn name(&self) -> &'static str;
    fn keep(&self, record: &ArticleRecord) -> bool;
}

/// Keeps records mentioning any keyword in the title, a tag or the preview.
///
/// Matching is case-insensitive substring containment, so a keyword embedded
/// in a longer word still counts (`"AI"` matches `"Email"`).
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

impl RecordFilter for KeywordFilter {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn keep(&self, record: &ArticleRecord) -> bool {
        let title = record.title.to_lowercase();
        let content = record.content_preview.to_lowercase();
        let tags: Vec<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();

        self.keywords.iter().any(|keyword| {
            title.contains(keyword.as_str())
                || tags.iter().any(|tag| tag.contains(keyword.as_str()))
                || content.contains(keyword.as_str())
        })
    }
}

/// Keeps records published on one calendar day.
///
/// Records without a parsable date are dropped.
#[derive(Debug, Clone, Copy)]
pub struct DateWindowFilter {
    target: NaiveDate,
}

impl DateWindowFilter {
    pub fn new(target: NaiveDate) -> Self {
        Self { target }
    }
}

impl RecordFilter for DateWindowFilter {
    fn name(&self) -> &'static str {
        "date_window"
    }

    fn keep(&self, record: &ArticleRecord) -> bool {
        let Some(raw) = record.published_date.as_deref() else {
            return false;
        };
        match parse_published_date(raw) {
            Ok(date) => date == self.target,
            Err(e) => {
                debug!(url = %record.url, error = %e, "Dropping record with unparsable date");
                false
            }
        }
    }
}

/// Calendar date of an ISO-8601 timestamp, in the timestamp's own offset.
///
/// A trailing `Z` is read as `+00:00`. Offset-less datetimes and bare dates
/// are accepted as well.
pub fn parse_published_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").map_err(|_| DateParseError(raw.to_string()))
}

/// Conjunction of filters.
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<Box<dyn RecordFilter>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl RecordFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn keep(&self, record: &ArticleRecord) -> bool {
        self.filters.iter().all(|f| f.keep(record))
    }

    /// Retain the records every filter keeps, logging per-filter drop counts.
    #[instrument(level = "info", skip_all)]
    pub fn apply(&self, records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
        let before = records.len();
        for filter in &self.filters {
            let dropped = records.iter().filter(|r| !filter.keep(r)).count();
            debug!(filter = filter.name(), dropped, "Filter evaluated");
        }
        let kept: Vec<ArticleRecord> = records.into_iter().filter(|r| self.keep(r)).collect();
        info!(before, after = kept.len(), "Applied record filters");
        kept
    }
}
