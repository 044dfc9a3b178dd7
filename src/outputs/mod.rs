//! Output generation for the final record list.
//!
//! # Submodules
//!
//! - [`csv`]: BOM-prefixed CSV with a fixed column order
//! - [`json`]: array of article objects with the same fields
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── note_articles_20240101_093000.csv
//! └── note_articles_20240101_093000.json
//! ```

pub mod csv;
pub mod json;

use crate::error::SinkError;
use crate::models::ArticleRecord;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Prefix shared by both output files.
const FILE_STEM: &str = "note_articles";

/// Paths written by [`write_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, timestamp: &str) -> Self {
        Self {
            csv: output_dir.join(format!("{FILE_STEM}_{timestamp}.csv")),
            json: output_dir.join(format!("{FILE_STEM}_{timestamp}.json")),
        }
    }
}

/// Write both output files. An empty record list still produces both files.
#[instrument(level = "info", skip_all, fields(%timestamp, count = records.len()))]
pub async fn write_all(
    records: &[ArticleRecord],
    output_dir: &Path,
    timestamp: &str,
) -> Result<OutputPaths, SinkError> {
    let paths = OutputPaths::new(output_dir, timestamp);
    csv::write_records(records, &paths.csv).await?;
    json::write_records(records, &paths.json).await?;
    Ok(paths)
}
