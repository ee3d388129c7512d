#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading for the accident dashboard.
//!
//! [`load_dataset`] fetches a raw table from a [`DatasetSource`] and cleans
//! it once. [`cache::DatasetCache`] keeps the result for the lifetime of the
//! process, and [`config::AppConfig`] says which source to use and how the
//! dashboard is tuned.

pub mod cache;
pub mod config;

use std::sync::Arc;

use accident_dash_accident_models::RequiredField;
use accident_dash_analytics::clean::{self, CleanedTable};
use accident_dash_analytics_models::SchemaStatus;
use accident_dash_source::progress::ProgressCallback;
use accident_dash_source::{DatasetSource, LoadOptions, SourceError};
use thiserror::Error;

pub use cache::{DatasetCache, DatasetKey};

/// Reasons a dataset could not be made available.
///
/// Every variant is terminal for the session: there is nothing to display
/// until the source is fixed and the cache entry is reloaded.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The source collaborator failed.
    #[error("Failed to load dataset '{id}': {source}")]
    Fetch {
        /// Dataset id.
        id: String,
        /// Underlying failure.
        #[source]
        source: SourceError,
    },

    /// The source returned no rows, or none survived cleaning.
    #[error("Dataset '{id}' contains no usable rows")]
    Empty {
        /// Dataset id.
        id: String,
    },

    /// A key column is missing, so no row can be typed.
    #[error("Dataset '{id}' is missing required columns: {}", column_list(.missing))]
    UnusableSchema {
        /// Dataset id.
        id: String,
        /// The missing columns.
        missing: Vec<RequiredField>,
    },

    /// The cleaning task panicked or was cancelled.
    #[error("Cleaning task for '{id}' failed: {source}")]
    Task {
        /// Dataset id.
        id: String,
        /// Underlying failure.
        #[source]
        source: tokio::task::JoinError,
    },
}

fn column_list(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.column_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A cleaned table together with the identity it was loaded under.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDataset {
    /// Identity of the source snapshot.
    pub key: DatasetKey,
    /// The cleaned records.
    pub table: CleanedTable,
}

/// Fetches and cleans one dataset.
///
/// # Errors
///
/// Returns [`DatasetError`] if the source fails, returns nothing, lacks a
/// key column, or no row survives cleaning.
pub async fn load_dataset(
    source: &dyn DatasetSource,
    options: &LoadOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<CleanedDataset, DatasetError> {
    let key = DatasetKey::new(source, options);
    let id = key.id.clone();

    let raw = source
        .load(options, progress)
        .await
        .map_err(|source| DatasetError::Fetch {
            id: id.clone(),
            source,
        })?;

    if raw.is_empty() {
        log::warn!("[{id}] Source returned no rows");
        return Err(DatasetError::Empty { id });
    }

    let table = tokio::task::spawn_blocking(move || clean::clean(&raw))
        .await
        .map_err(|source| DatasetError::Task {
            id: id.clone(),
            source,
        })?;

    match &table.schema.status {
        SchemaStatus::Full => log::info!("[{id}] All required columns present"),
        SchemaStatus::Partial { missing } => {
            log::warn!(
                "[{id}] Missing optional columns: {}",
                column_list(missing)
            );
        }
        SchemaStatus::Unusable { missing } => {
            log::error!("[{id}] Missing key columns: {}", column_list(missing));
            return Err(DatasetError::UnusableSchema {
                id,
                missing: missing.clone(),
            });
        }
    }

    let stats = table.stats;
    log::info!(
        "[{id}] Cleaned {} rows: kept {}, dropped {} with missing values and {} with bad timestamps",
        stats.input_rows,
        stats.retained,
        stats.missing_values,
        stats.bad_timestamps
    );

    if table.is_empty() {
        return Err(DatasetError::Empty { id });
    }

    Ok(CleanedDataset { key, table })
}

#[cfg(test)]
pub(crate) mod tests {
    use accident_dash_source::RawTable;
    use accident_dash_source::memory::InMemorySource;
    use accident_dash_source::progress::null_progress;

    use super::*;

    pub(crate) fn sample_table() -> RawTable {
        let headers = RequiredField::all()
            .iter()
            .map(|f| f.column_name().to_string())
            .collect();
        let row = |state: &str, severity: &str, time: &str| -> Vec<String> {
            [
                state, severity, time, "Clear", "10.0", "65.0", "8.0", "34.05", "-118.24",
            ]
            .iter()
            .map(ToString::to_string)
            .collect()
        };
        RawTable::new(
            headers,
            vec![
                row("CA", "2", "2021-04-01 10:00:00"),
                row("CA", "3", "2022-06-15 08:30:00"),
                row("TX", "4", "not a time"),
            ],
        )
    }

    #[tokio::test]
    async fn loads_and_cleans() {
        let source = InMemorySource::new("test", "v1", sample_table());
        let dataset = load_dataset(&source, &LoadOptions::default(), null_progress())
            .await
            .unwrap();
        assert_eq!(dataset.key.id, "test");
        assert_eq!(dataset.key.version, "v1");
        assert_eq!(dataset.table.len(), 2);
        assert_eq!(dataset.table.stats.bad_timestamps, 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let source = InMemorySource::failing("broken", "v1");
        let err = load_dataset(&source, &LoadOptions::default(), null_progress())
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::Fetch { ref id, .. } if id == "broken"));
    }

    #[tokio::test]
    async fn empty_source_is_reported() {
        let source = InMemorySource::new("empty", "v1", RawTable::new(vec!["State".into()], vec![]));
        let err = load_dataset(&source, &LoadOptions::default(), null_progress())
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::Empty { .. }));
    }

    #[tokio::test]
    async fn missing_key_column_is_reported() {
        let table = RawTable::new(
            vec!["State".to_string(), "Start_Time".to_string()],
            vec![vec!["CA".to_string(), "2021-04-01 10:00:00".to_string()]],
        );
        let source = InMemorySource::new("no_severity", "v1", table);
        let err = load_dataset(&source, &LoadOptions::default(), null_progress())
            .await
            .unwrap_err();
        let DatasetError::UnusableSchema { missing, .. } = &err else {
            panic!("unexpected error: {err}");
        };
        assert!(missing.contains(&RequiredField::Severity));
        assert!(err.to_string().contains("Severity"));
    }
}
