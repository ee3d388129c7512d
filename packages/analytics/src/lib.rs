#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cleaning, filtering and aggregation pipeline behind the accident
//! dashboard.
//!
//! The pipeline runs in dependency order:
//!
//! 1. [`schema`] checks the raw columns against the required set.
//! 2. [`clean`] types the raw rows, drops incomplete ones and derives the
//!    calendar bucket.
//! 3. [`filter`] selects the records matching the user's region, severity
//!    and year choices.
//! 4. [`sample`], [`severity`], [`trend`] and [`weather`] each turn the
//!    filtered set into one chart-ready aggregate.
//!
//! [`dashboard::build_view`] runs steps 3 and 4 for one interaction. Every
//! function here is pure: the cleaned table is only ever borrowed.

pub mod clean;
pub mod dashboard;
pub mod filter;
pub mod options;
pub mod sample;
pub mod schema;
pub mod severity;
pub mod trend;
pub mod weather;

use accident_dash_accident_models::WeatherMetric;
use thiserror::Error;

/// Errors that can occur while deriving dashboard views.
///
/// None of these affect the cleaned table; the caller can change the
/// filter and try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// The filter excluded every record.
    #[error("No data for the selected filters")]
    EmptyResult,

    /// Outlier filtering for the chosen metric removed every record.
    #[error("No {metric} values left after outlier filtering")]
    MetricCleaningEmpty {
        /// The metric being aggregated.
        metric: WeatherMetric,
    },

    /// The dataset has no column for the chosen metric.
    #[error("Dataset has no {metric} column")]
    MetricUnavailable {
        /// The metric being aggregated.
        metric: WeatherMetric,
    },

    /// The filter itself is malformed.
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of what went wrong.
        message: String,
    },
}
