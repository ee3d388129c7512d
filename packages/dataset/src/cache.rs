//! Process-owned cache of cleaned datasets.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use accident_dash_source::progress::ProgressCallback;
use accident_dash_source::{DatasetSource, LoadOptions};
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};

use crate::{CleanedDataset, DatasetError, load_dataset};

/// Identity of one loaded snapshot.
///
/// The row limit is part of the key because it changes which rows the
/// table holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetKey {
    /// Source id.
    pub id: String,
    /// Source version.
    pub version: String,
    /// Row cap the snapshot was loaded with.
    pub row_limit: Option<u64>,
}

impl DatasetKey {
    /// The key `source` loads under with `options`.
    #[must_use]
    pub fn new(source: &dyn DatasetSource, options: &LoadOptions) -> Self {
        Self {
            id: source.id().to_string(),
            version: source.version().to_string(),
            row_limit: options.row_limit,
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)?;
        if let Some(limit) = self.row_limit {
            write!(f, " (first {limit} rows)")?;
        }
        Ok(())
    }
}

/// Outcome of one load, kept until the key is invalidated.
pub type LoadResult = Result<Arc<CleanedDataset>, Arc<DatasetError>>;

type Slot = Arc<OnceCell<LoadResult>>;

/// Cleaned datasets shared read-only across requests.
///
/// Each key owns a slot that is filled exactly once. The map lock is only
/// held to find or insert a slot, so lookups and loads of other keys never
/// wait behind a slow fetch. Concurrent callers asking for the same key
/// await the same slot and share one fetch.
///
/// Failed loads are cached like successful ones. The source is not
/// contacted again until the key is invalidated.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<BTreeMap<DatasetKey, Slot>>,
}

impl DatasetCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached outcome for `source`, loading it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the [`DatasetError`] of the load that filled this key's slot,
    /// whether it ran during this call or an earlier one.
    pub async fn get_or_load(
        &self,
        source: &dyn DatasetSource,
        options: &LoadOptions,
        progress: Arc<dyn ProgressCallback>,
    ) -> LoadResult {
        let key = DatasetKey::new(source, options);
        let slot = Arc::clone(self.entries.lock().await.entry(key.clone()).or_default());

        if let Some(result) = slot.get() {
            log::debug!("Cache hit for {key}");
            return result.clone();
        }

        slot.get_or_init(|| async {
            log::info!("Cache miss for {key}, loading");
            let result = load_dataset(source, options, progress).await;
            if let Err(e) = &result {
                log::error!("Caching failed load of {key}: {e}");
            }
            result.map(Arc::new).map_err(Arc::new)
        })
        .await
        .clone()
    }

    /// Returns the cached dataset for `key` without loading.
    ///
    /// `None` while the key is absent, still loading, or cached as a
    /// failure.
    pub async fn get(&self, key: &DatasetKey) -> Option<Arc<CleanedDataset>> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .and_then(|slot| slot.get())
            .and_then(|result| result.as_ref().ok())
            .cloned()
    }

    /// Drops the entry for `key`, loaded or failed. Returns whether one was
    /// present.
    ///
    /// Requests already holding the old table keep using it.
    pub async fn invalidate(&self, key: &DatasetKey) -> bool {
        let removed = self.entries.lock().await.remove(key).is_some();
        if removed {
            log::info!("Invalidated {key}");
        }
        removed
    }

    /// Drops every entry. Returns how many were present.
    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let count = entries.len();
        entries.clear();
        drop(entries);
        log::info!("Invalidated {count} cached dataset(s)");
        count
    }

    /// Keys of every successfully loaded dataset, in order.
    pub async fn keys(&self) -> Vec<DatasetKey> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter(|(_, slot)| matches!(slot.get(), Some(Ok(_))))
            .map(|(key, _)| key.clone())
            .collect()
    }
}
