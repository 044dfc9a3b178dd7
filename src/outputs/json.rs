//! JSON output: one array of article objects per run.

use crate::error::SinkError;
use crate::models::ArticleRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `records` as a pretty-printed JSON array.
///
/// Non-ASCII text is written as-is, not escaped.
pub fn records_to_json(records: &[ArticleRecord]) -> Result<String, SinkError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write the JSON array to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_records(records: &[ArticleRecord], path: &Path) -> Result<(), SinkError> {
    let json = records_to_json(records)?;
    fs::write(path, json).await.map_err(|source| SinkError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(count = records.len(), "Wrote JSON file");
    Ok(())
}
