//! CSV output: UTF-8 with a byte-order mark so spreadsheet tools detect the
//! encoding of Japanese text.
//!
//! Fields are quoted when they contain a comma, quote, CR or LF; embedded
//! quotes are doubled. Tags share one column, joined by `", "`.

use crate::error::SinkError;
use crate::models::ArticleRecord;
use itertools::Itertools;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const BOM: &str = "\u{feff}";

/// Fixed column order.
pub const COLUMNS: [&str; 7] = [
    "url",
    "title",
    "author",
    "publishedDate",
    "likes",
    "tags",
    "contentPreview",
];

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render `records` as CSV text, BOM included.
pub fn records_to_csv(records: &[ArticleRecord]) -> String {
    let mut out = String::from(BOM);
    writeln!(out, "{}", COLUMNS.join(",")).unwrap();

    for record in records {
        let tags = record.tags.iter().join(", ");
        let row = [
            record.url.as_str(),
            record.title.as_str(),
            record.author.as_str(),
            record.published_date.as_deref().unwrap_or(""),
            record.like_count.as_str(),
            tags.as_str(),
            record.content_preview.as_str(),
        ];
        writeln!(out, "{}", row.iter().map(|f| escape(f)).join(",")).unwrap();
    }
    out
}

/// Write the CSV file to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_records(records: &[ArticleRecord], path: &Path) -> Result<(), SinkError> {
    fs::write(path, records_to_csv(records))
        .await
        .map_err(|source| SinkError::Io {
            path: path.display().to_string(),
            source,
        })?;
    info!(count = records.len(), "Wrote CSV file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;

    #[test]
    fn test_header_and_bom() {
        let csv = records_to_csv(&[]);
        assert!(csv.starts_with('\u{feff}'));
        assert_eq!(
            csv.trim_start_matches('\u{feff}'),
            "url,title,author,publishedDate,likes,tags,contentPreview\n"
        );
    }

    #[test]
    fn test_row_quoting() {
        let mut record = ArticleRecord::from_candidate(Candidate {
            url: "https://note.com/a/n/1".to_string(),
            title_hint: "Say \"hi\", world".to_string(),
        });
        record.tags = vec!["#AI".to_string(), "#LLM".to_string()];
        record.content_preview = "line one\nline two".to_string();
        record.published_date = Some("2024-01-01T10:00:00Z".to_string());

        let csv = records_to_csv(&[record]);
        let body = csv.lines().skip(1).collect::<Vec<_>>().join("\n");
        assert_eq!(
            body,
            "https://note.com/a/n/1,\"Say \"\"hi\"\", world\",author-unknown,2024-01-01T10:00:00Z,0,\"#AI, #LLM\",\"line one\nline two\""
        );
    }

    #[test]
    fn test_escape_plain_field() {
        assert_eq!(escape("plain"), "plain");
    }
}
