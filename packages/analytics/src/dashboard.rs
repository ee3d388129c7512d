//! One interaction: filter the cleaned table and build every chart.

use accident_dash_accident_models::{AccidentRecord, WeatherMetric};
use accident_dash_analytics_models::{
    DashboardConfig, DashboardFilter, DashboardView, MetricFrequencies, WeatherPanel,
};

use crate::clean::CleanedTable;
use crate::{AnalyticsError, filter, sample, severity, trend, weather};

/// Validates `filter` and applies it, refusing an empty result.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] for a malformed filter and
/// [`AnalyticsError::EmptyResult`] when nothing matches.
pub fn filtered<'a>(
    table: &'a CleanedTable,
    filter: &DashboardFilter,
) -> Result<Vec<&'a AccidentRecord>, AnalyticsError> {
    filter::validate(filter)?;
    let records = filter::apply(&table.records, filter);
    if records.is_empty() {
        return Err(AnalyticsError::EmptyResult);
    }
    Ok(records)
}

/// Builds the weather panel for `metric`.
///
/// A metric that is unavailable or filtered down to nothing is reported in
/// the panel rather than as an error, so the monthly table and the other
/// charts still render.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyResult`] if `records` is empty.
pub fn weather_panel(
    records: &[&AccidentRecord],
    metric: WeatherMetric,
    config: &DashboardConfig,
) -> Result<WeatherPanel, AnalyticsError> {
    let frequency =
        match weather::metric_frequency(records, metric, &config.thresholds, config.rounding) {
            Ok(values) => MetricFrequencies::Ready { values },
            Err(AnalyticsError::MetricCleaningEmpty { .. }) => MetricFrequencies::MetricCleaningEmpty,
            Err(AnalyticsError::MetricUnavailable { .. }) => MetricFrequencies::MetricUnavailable,
            Err(e) => return Err(e),
        };

    Ok(WeatherPanel {
        metric,
        frequency,
        monthly: weather::monthly_weather(records),
    })
}

/// Builds every chart for one filter selection.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] for a malformed filter and
/// [`AnalyticsError::EmptyResult`] when the filter matches nothing.
pub fn build_view(
    table: &CleanedTable,
    filter: &DashboardFilter,
    metric: WeatherMetric,
    config: &DashboardConfig,
) -> Result<DashboardView, AnalyticsError> {
    let records = filtered(table, filter)?;

    log::debug!(
        "Building view for {} ({} severities, {}..={}): {} records",
        filter.region,
        filter.severities.len(),
        filter.years.start,
        filter.years.end,
        records.len()
    );

    Ok(DashboardView {
        filter: filter.clone(),
        total: records.len() as u64,
        map: sample::sample_points(&records, config.map_sample_cap, config.sample_seed),
        severity: severity::severity_distribution(&records),
        monthly_trend: trend::monthly_trend(&records),
        weather: weather_panel(&records, metric, config)?,
        visibility_ranges: weather::visibility_ranges(&records),
    })
}
