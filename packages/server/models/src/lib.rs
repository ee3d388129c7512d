#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the accident dashboard server.
//!
//! Chart payloads reuse the analytics result types directly; this crate
//! only adds the query-string shapes and the envelopes around them.

use accident_dash_accident_models::{AccidentSeverity, WeatherMetric};
use accident_dash_analytics_models::{CleanStats, FilterOptions, FilterSelection, SchemaReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A query parameter that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamError {
    #[error("Invalid severity '{0}' (expected a whole number such as 1-4)")]
    Severity(String),

    #[error("Unknown metric '{0}' (expected visibility, temperature or wind_speed)")]
    Metric(String),
}

/// Filter query parameters shared by the dashboard and weather endpoints.
///
/// Every parameter is optional; unset ones take the dashboard defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQueryParams {
    /// Region code, e.g. `CA`.
    pub region: Option<String>,
    /// Comma-separated severity levels, e.g. `2,3`.
    pub severities: Option<String>,
    /// First year included.
    pub year_from: Option<i32>,
    /// Last year included.
    pub year_to: Option<i32>,
    /// Weather metric (`visibility`, `temperature` or `wind_speed`).
    pub metric: Option<String>,
}

impl FilterQueryParams {
    /// Converts the query into a filter selection.
    ///
    /// An empty `severities` value selects no levels, which the resolver
    /// rejects; an absent one selects all.
    ///
    /// # Errors
    ///
    /// Returns [`QueryParamError::Severity`] if a severity is not a whole
    /// number. Levels the data does not contain are accepted and simply
    /// match nothing.
    pub fn selection(&self) -> Result<FilterSelection, QueryParamError> {
        let severities = self
            .severities
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| {
                        v.parse::<AccidentSeverity>()
                            .map_err(|_| QueryParamError::Severity(v.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(FilterSelection {
            region: self
                .region
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(ToString::to_string),
            severities,
            year_from: self.year_from,
            year_to: self.year_to,
        })
    }

    /// The requested metric, if any.
    ///
    /// # Errors
    ///
    /// Returns [`QueryParamError::Metric`] for an unknown metric name.
    pub fn metric(&self) -> Result<Option<WeatherMetric>, QueryParamError> {
        self.metric
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| m.parse().map_err(|_| QueryParamError::Metric(m.to_string())))
            .transpose()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Whether the configured dataset is already cached.
    pub dataset_loaded: bool,
}

/// Description of the loaded dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    pub id: String,
    pub version: String,
    /// Records retained after cleaning.
    pub records: u64,
    pub schema: SchemaReport,
    pub stats: CleanStats,
}

/// Response of `GET /api/options`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOptions {
    pub dataset: ApiDataset,
    /// Choices and defaults for the filter widgets.
    pub options: FilterOptions,
    /// Metric shown when none is requested.
    pub default_metric: WeatherMetric,
}

/// Response of `POST /api/cache/invalidate`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInvalidated {
    /// Number of cached datasets dropped.
    pub invalidated: usize,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable kind, e.g. `emptyResult`.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}
