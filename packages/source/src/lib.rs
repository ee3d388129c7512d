#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident dataset source trait, CSV fetchers and raw table type.
//!
//! A [`DatasetSource`] knows how to produce a [`RawTable`]: untyped rows
//! keyed by the header row of the underlying CSV. Typing, validation and
//! cleaning happen downstream in `accident_dash_analytics`.

pub mod csv_download;
pub mod csv_file;
pub mod memory;
pub mod parsing;
pub mod progress;
pub mod raw;
pub mod registry;
pub mod source_def;

use std::sync::Arc;

use async_trait::async_trait;

pub use raw::RawTable;

use crate::progress::ProgressCallback;

/// Row cap applied when neither the caller nor the source definition
/// specifies one.
pub const DEFAULT_ROW_LIMIT: u64 = 500_000;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (file read, decompression).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Source definition TOML is malformed.
    #[error("Source definition error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Blocking parse task panicked or was cancelled.
    #[error("Parse task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The source returned something that cannot be used as a table.
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Description of what went wrong.
        message: String,
    },
}

/// Options for a single load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Maximum number of data rows to read. `None` reads everything.
    pub row_limit: Option<u64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            row_limit: Some(DEFAULT_ROW_LIMIT),
        }
    }
}

impl LoadOptions {
    /// Combines this load's cap with a source-specific cap, keeping the
    /// smaller of the two.
    #[must_use]
    pub fn effective_limit(&self, source_limit: Option<u64>) -> Option<u64> {
        match (self.row_limit, source_limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Trait that all accident data sources implement.
///
/// The pair `(id, version)` identifies a dataset for caching purposes: two
/// sources with the same identity are expected to produce the same table.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g. `"us_accidents"`).
    fn id(&self) -> &str;

    /// Returns the dataset version (e.g. `"March23"`).
    fn version(&self) -> &str;

    /// Fetches the raw table.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch or CSV parsing fails.
    async fn load(
        &self,
        options: &LoadOptions,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<RawTable, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_limit_takes_smaller_cap() {
        let options = LoadOptions {
            row_limit: Some(500),
        };
        assert_eq!(options.effective_limit(Some(100)), Some(100));
        assert_eq!(options.effective_limit(Some(1000)), Some(500));
        assert_eq!(options.effective_limit(None), Some(500));
    }

    #[test]
    fn effective_limit_without_caller_cap() {
        let options = LoadOptions { row_limit: None };
        assert_eq!(options.effective_limit(Some(100)), Some(100));
        assert_eq!(options.effective_limit(None), None);
    }

    #[test]
    fn default_options_cap_rows() {
        assert_eq!(LoadOptions::default().row_limit, Some(DEFAULT_ROW_LIMIT));
    }
}
