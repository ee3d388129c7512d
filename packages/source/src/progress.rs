//! Row-count reporting while a dataset is read.
//!
//! Parsers call into a [`ProgressCallback`] as rows arrive. The CLI draws
//! them as a terminal bar; the server and tests pass [`null_progress`].

use std::sync::Arc;

/// Receives row counts from a load in progress.
///
/// Parsing runs on a blocking thread, hence `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// The number of rows the load will stop at, once a row cap is known.
    fn set_total(&self, total: u64);

    /// `delta` more rows were read.
    fn inc(&self, delta: u64);

    /// Replaces the label, e.g. with the file being read.
    fn set_message(&self, msg: String);

    /// The load is over; `msg` summarizes it.
    fn finish(&self, msg: String);
}

/// Discards every report.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// A [`NullProgress`] ready to hand to a loader.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
