//! In-memory dataset source.
//!
//! Serves a fixed [`RawTable`]; used for embedding pre-parsed data and in
//! tests of the loading pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::progress::ProgressCallback;
use crate::{DatasetSource, LoadOptions, RawTable, SourceError};

/// A [`DatasetSource`] backed by a table held in memory.
pub struct InMemorySource {
    id: String,
    version: String,
    table: Option<RawTable>,
    loads: AtomicUsize,
}

impl InMemorySource {
    /// Creates a source that serves `table`.
    #[must_use]
    pub fn new(id: &str, version: &str, table: RawTable) -> Self {
        Self {
            id: id.to_owned(),
            version: version.to_owned(),
            table: Some(table),
            loads: AtomicUsize::new(0),
        }
    }

    /// Creates a source whose every load fails.
    #[must_use]
    pub fn failing(id: &str, version: &str) -> Self {
        Self {
            id: id.to_owned(),
            version: version.to_owned(),
            table: None,
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of times [`DatasetSource::load`] has been called.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetSource for InMemorySource {
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
        self.loads.fetch_add(1, Ordering::SeqCst);

        let Some(table) = &self.table else {
            return Err(SourceError::InvalidData {
                message: format!("source '{}' is unavailable", self.id),
            });
        };

        let mut table = table.clone();
        if let Some(limit) = options.row_limit {
            table.rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        progress.inc(table.len() as u64);
        progress.finish(format!("[{}] {} rows", self.id, table.len()));
        Ok(table)
    }
}
