//! Config-driven dataset source definition.
//!
//! [`SourceDefinition`] captures everything about where a dataset comes
//! from in a serializable config struct, so a single generic
//! implementation of [`DatasetSource`] serves every source.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::csv_download::{CsvDownloadConfig, fetch_csv_download};
use crate::csv_file::fetch_csv_file;
use crate::parsing::CsvOptions;
use crate::progress::ProgressCallback;
use crate::{DatasetSource, LoadOptions, RawTable, SourceError};

fn default_version() -> String {
    "1".to_string()
}

// ── Top-level source definition ──────────────────────────────────────────

/// A complete, config-driven dataset source definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g. `"us_accidents"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Dataset version; part of the cache key.
    #[serde(default = "default_version")]
    pub version: String,
    /// Source-specific row cap, combined with the caller's cap.
    #[serde(default)]
    pub row_limit: Option<u64>,
    /// How to fetch the raw data.
    pub fetcher: FetcherConfig,
}

// ── Fetcher config ───────────────────────────────────────────────────────

/// How to fetch the raw CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// A CSV file on local disk.
    CsvFile {
        /// Path to the file, relative to the working directory.
        path: PathBuf,
        /// Field delimiter (default: comma).
        #[serde(default)]
        delimiter: Option<String>,
        /// Compression format (`"gzip"` or `None`).
        #[serde(default)]
        compressed: Option<String>,
    },
    /// A CSV file fetched over HTTP.
    CsvDownload {
        /// URL of the CSV file.
        url: String,
        /// Field delimiter (default: comma).
        #[serde(default)]
        delimiter: Option<String>,
        /// Compression format (`"gzip"` or `None`).
        #[serde(default)]
        compressed: Option<String>,
        /// Additional HTTP headers.
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
}

impl SourceDefinition {
    /// Returns a copy of this definition that reads from a local file
    /// instead, keeping the identity and row cap.
    ///
    /// The version is suffixed with the path so a cached table for the
    /// original location is never served for the override.
    #[must_use]
    pub fn with_local_file(&self, path: PathBuf) -> Self {
        Self {
            version: format!("{}+{}", self.version, path.display()),
            fetcher: FetcherConfig::CsvFile {
                path,
                delimiter: None,
                compressed: None,
            },
            ..self.clone()
        }
    }
}

#[async_trait]
impl DatasetSource for SourceDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn load(
        &self,
        options: &LoadOptions,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<RawTable, SourceError> {
        let limit = options.effective_limit(self.row_limit);
        log::info!(
            "[{}] Loading {} (version {}, row limit {})",
            self.id,
            self.name,
            self.version,
            limit.map_or_else(|| "none".to_string(), |l| l.to_string())
        );

        match &self.fetcher {
            FetcherConfig::CsvFile {
                path,
                delimiter,
                compressed,
            } => {
                let csv = CsvOptions::from_config(delimiter.as_deref(), compressed.as_deref(), limit);
                fetch_csv_file(path, csv, progress).await
            }
            FetcherConfig::CsvDownload {
                url,
                delimiter,
                compressed,
                headers,
            } => {
                let config = CsvDownloadConfig {
                    url,
                    label: &self.id,
                    headers,
                    csv: CsvOptions::from_config(
                        delimiter.as_deref(),
                        compressed.as_deref(),
                        limit,
                    ),
                };
                fetch_csv_download(&config, progress).await
            }
        }
    }
}

/// Parses a [`SourceDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}
