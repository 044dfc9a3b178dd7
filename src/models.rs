//! Data models for harvested candidates and extracted article records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Candidate`]: an article link found on a search-results page
//! - [`ArticleRecord`]: the per-URL output row, seeded from a candidate and
//!   merged once with the extraction result
//! - [`ExtractedFields`]: everything the six field chains produced for one page
//!
//! Field names serialize in camelCase to match the structured output files.

use serde::{Deserialize, Serialize};

/// Title used when every title strategy and the search seed come up empty.
pub const TITLE_UNKNOWN: &str = "title-unknown";
/// Author used when no author strategy matches.
pub const AUTHOR_UNKNOWN: &str = "author-unknown";
/// Like count used when no like strategy matches.
pub const LIKES_DEFAULT: &str = "0";
/// Degraded-record title for URLs rejected without fetching.
pub const TITLE_INVALID_URL: &str = "invalid-url";
/// Degraded-record title for URLs whose fetch failed.
pub const TITLE_FETCH_ERROR: &str = "fetch-error";

/// An article link discovered by the link harvester.
///
/// # Fields
///
/// * `url` - Canonical absolute URL, unique across the whole crawl
/// * `title_hint` - Title text found next to the link, empty if none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Canonical absolute article URL.
    pub url: String,
    /// Title read from the search card, or an empty string.
    pub title_hint: String,
}

/// A single article as written to the output files.
///
/// Created from a [`Candidate`] with sentinel values, then replaced exactly
/// once by [`ArticleRecord::merge`] or [`ArticleRecord::degrade`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Canonical absolute URL; the unique key.
    pub url: String,
    /// Title seen on the search page. Never serialized.
    #[serde(skip)]
    pub title_from_search: Option<String>,
    /// Article title, never empty.
    pub title: String,
    /// Author handle or display name.
    pub author: String,
    /// ISO-8601 publish timestamp as found on the page.
    pub published_date: Option<String>,
    /// Like count as a non-negative integer string.
    #[serde(rename = "likes")]
    pub like_count: String,
    /// Hashtags in document order.
    pub tags: Vec<String>,
    /// Up to three leading paragraphs joined by newlines.
    pub content_preview: String,
}

/// The outcome of running every field chain against one detail document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub title: String,
    pub author: String,
    pub published_date: Option<String>,
    pub like_count: String,
    pub tags: Vec<String>,
    pub content_preview: String,
}

impl ArticleRecord {
    /// Seed a record from a harvested candidate with every field at its sentinel.
    pub fn from_candidate(candidate: Candidate) -> Self {
        let seed = Some(candidate.title_hint).filter(|t| !t.trim().is_empty());
        Self {
            url: candidate.url,
            title: seed.clone().unwrap_or_else(|| TITLE_UNKNOWN.to_string()),
            title_from_search: seed,
            author: AUTHOR_UNKNOWN.to_string(),
            published_date: None,
            like_count: LIKES_DEFAULT.to_string(),
            tags: Vec::new(),
            content_preview: String::new(),
        }
    }

    /// The non-empty search seed, if any.
    pub fn seed_title(&self) -> Option<&str> {
        self.title_from_search.as_deref()
    }

    /// Overwrite the sentinel fields with chain results.
    pub fn merge(self, fields: ExtractedFields) -> Self {
        Self {
            url: self.url,
            title_from_search: self.title_from_search,
            title: fields.title,
            author: fields.author,
            published_date: fields.published_date,
            like_count: fields.like_count,
            tags: fields.tags,
            content_preview: fields.content_preview,
        }
    }

    /// Produce the degraded form used when details could not be retrieved.
    ///
    /// The title falls back to the search seed, then to `fallback_title`.
    pub fn degrade(self, fallback_title: &str, note: String) -> Self {
        let title = self
            .title_from_search
            .clone()
            .unwrap_or_else(|| fallback_title.to_string());
        Self {
            url: self.url,
            title_from_search: self.title_from_search,
            title,
            author: AUTHOR_UNKNOWN.to_string(),
            published_date: None,
            like_count: LIKES_DEFAULT.to_string(),
            tags: Vec::new(),
            content_preview: note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, hint: &str) -> Candidate {
        Candidate {
            url: url.to_string(),
            title_hint: hint.to_string(),
        }
    }

    #[test]
    fn test_from_candidate_uses_sentinels() {
        let record = ArticleRecord::from_candidate(candidate("https://note.com/a/n/n1", ""));
        assert_eq!(record.title, TITLE_UNKNOWN);
        assert_eq!(record.author, AUTHOR_UNKNOWN);
        assert_eq!(record.like_count, "0");
        assert_eq!(record.published_date, None);
        assert!(record.tags.is_empty());
        assert_eq!(record.seed_title(), None);
    }

    #[test]
    fn test_whitespace_hint_is_not_a_seed() {
        let record = ArticleRecord::from_candidate(candidate("https://note.com/a/n/n1", "   "));
        assert_eq!(record.seed_title(), None);
    }

    #[test]
    fn test_degrade_prefers_seed_title() {
        let record = ArticleRecord::from_candidate(candidate("https://note.com/a/n/n1", "Seeded"));
        let degraded = record.degrade(TITLE_FETCH_ERROR, "boom".to_string());
        assert_eq!(degraded.title, "Seeded");
        assert_eq!(degraded.content_preview, "boom");

        let bare = ArticleRecord::from_candidate(candidate("https://note.com/a/n/n2", ""));
        assert_eq!(bare.degrade(TITLE_INVALID_URL, String::new()).title, "invalid-url");
    }

    #[test]
    fn test_merge_keeps_url() {
        let record = ArticleRecord::from_candidate(candidate("https://note.com/a/n/n1", "Seed"));
        let merged = record.merge(ExtractedFields {
            title: "Real".to_string(),
            author: "alice".to_string(),
            published_date: Some("2024-01-01T10:00:00Z".to_string()),
            like_count: "12".to_string(),
            tags: vec!["AI".to_string()],
            content_preview: "Body".to_string(),
        });
        assert_eq!(merged.url, "https://note.com/a/n/n1");
        assert_eq!(merged.title, "Real");
        assert_eq!(merged.like_count, "12");
    }

    #[test]
    fn test_record_serialization_skips_seed() {
        let record = ArticleRecord::from_candidate(candidate("https://note.com/a/n/n1", "Seed"));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("titleFromSearch").is_none());
        assert_eq!(json["likes"], "0");
        assert!(json["publishedDate"].is_null());
        assert_eq!(json["contentPreview"], "");
    }
}
