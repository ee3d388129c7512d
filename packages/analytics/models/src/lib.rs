#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, configuration and chart-ready result types for the accident
//! dashboard.
//!
//! Every aggregate the presentation layer renders is one of the types in
//! this crate, so the API contract can evolve independently of the
//! pipeline that produces it.

use std::collections::BTreeSet;

use accident_dash_accident_models::{AccidentSeverity, RequiredField, WeatherMetric, YearMonth};
use serde::{Deserialize, Serialize};

// ── Filters ──────────────────────────────────────────────────────────────

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRange {
    /// First year included.
    pub start: i32,
    /// Last year included.
    pub end: i32,
}

impl YearRange {
    /// Creates a range covering `start..=end`.
    #[must_use]
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// A range covering exactly one year.
    #[must_use]
    pub const fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    /// Whether `year` falls inside the range.
    #[must_use]
    pub const fn contains(self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Whether the range is inverted and therefore matches nothing.
    #[must_use]
    pub const fn is_inverted(self) -> bool {
        self.start > self.end
    }
}

/// The user's current filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilter {
    /// Selected region code.
    pub region: String,
    /// Allowed severity levels.
    pub severities: BTreeSet<AccidentSeverity>,
    /// Allowed years, inclusive.
    pub years: YearRange,
}

/// A possibly incomplete filter selection, as it arrives from a UI control
/// or a query string. Unset parts take the dashboard defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Selected region code.
    pub region: Option<String>,
    /// Selected severity levels.
    pub severities: Option<Vec<AccidentSeverity>>,
    /// First year included.
    pub year_from: Option<i32>,
    /// Last year included.
    pub year_to: Option<i32>,
}

// ── Configuration ────────────────────────────────────────────────────────

/// Upper-bound outlier rule for a weather metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutlierRule {
    /// Largest plausible value.
    pub max: f64,
    /// Whether `max` itself is kept.
    #[serde(default)]
    pub inclusive: bool,
}

impl OutlierRule {
    /// Whether `value` passes this rule.
    #[must_use]
    pub fn keeps(self, value: f64) -> bool {
        if self.inclusive {
            value <= self.max
        } else {
            value < self.max
        }
    }
}

/// Per-metric outlier rules applied before frequency binning.
///
/// `None` disables filtering for that metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct OutlierThresholds {
    /// Rule for visibility in miles.
    pub visibility_mi: Option<OutlierRule>,
    /// Rule for temperature in Fahrenheit.
    pub temperature_f: Option<OutlierRule>,
    /// Rule for wind speed in mph.
    pub wind_speed_mph: Option<OutlierRule>,
}

impl Default for OutlierThresholds {
    fn default() -> Self {
        Self {
            visibility_mi: Some(OutlierRule {
                max: 20.0,
                inclusive: true,
            }),
            temperature_f: None,
            wind_speed_mph: Some(OutlierRule {
                max: 100.0,
                inclusive: false,
            }),
        }
    }
}

impl OutlierThresholds {
    /// The rule configured for `metric`.
    #[must_use]
    pub const fn rule_for(&self, metric: WeatherMetric) -> Option<OutlierRule> {
        match metric {
            WeatherMetric::Visibility => self.visibility_mi,
            WeatherMetric::Temperature => self.temperature_f,
            WeatherMetric::WindSpeed => self.wind_speed_mph,
        }
    }
}

/// How metric values are rounded to integer bins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Ties go to the even neighbour (`2.5 -> 2`, `3.5 -> 4`).
    #[default]
    HalfEven,
    /// Ties go up (`2.5 -> 3`, `-2.5 -> -2`).
    HalfUp,
}

/// Tunables for the dashboard aggregations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DashboardConfig {
    /// Maximum number of points sent to the map.
    pub map_sample_cap: usize,
    /// Seed for the map sampler.
    pub sample_seed: u64,
    /// Region selected when the user has not picked one.
    pub default_region: String,
    /// Outlier rules for the weather frequency view.
    pub thresholds: OutlierThresholds,
    /// Rounding rule for the weather frequency view.
    pub rounding: RoundingMode,
}

/// Default cap on map points.
pub const DEFAULT_MAP_SAMPLE_CAP: usize = 10_000;

/// Default seed for the map sampler.
pub const DEFAULT_SAMPLE_SEED: u64 = 1;

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            map_sample_cap: DEFAULT_MAP_SAMPLE_CAP,
            sample_seed: DEFAULT_SAMPLE_SEED,
            default_region: "CA".to_string(),
            thresholds: OutlierThresholds::default(),
            rounding: RoundingMode::default(),
        }
    }
}

// ── Schema ───────────────────────────────────────────────────────────────

/// Outcome of checking a raw table's columns against the required set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SchemaStatus {
    /// Every required column is present.
    Full,
    /// Some optional columns are missing; cleaning runs on the rest.
    Partial {
        /// Columns that were not found.
        missing: Vec<RequiredField>,
    },
    /// A key column is missing; the table cannot be filtered.
    Unusable {
        /// Columns that were not found.
        missing: Vec<RequiredField>,
    },
}

/// Schema check result plus the columns that will be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    /// Classification of the schema.
    pub status: SchemaStatus,
    /// Required columns present in the raw table.
    pub present: Vec<RequiredField>,
}

impl SchemaReport {
    /// Whether `field` is available in the cleaned table.
    #[must_use]
    pub fn has(&self, field: RequiredField) -> bool {
        self.present.contains(&field)
    }

    /// Whether the table can be filtered at all.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        !matches!(self.status, SchemaStatus::Unusable { .. })
    }
}

/// Row counts dropped by the cleaner, per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanStats {
    /// Rows in the raw table.
    pub input_rows: u64,
    /// Rows dropped for a missing or unparseable required value.
    pub missing_values: u64,
    /// Rows dropped because the timestamp did not parse.
    pub bad_timestamps: u64,
    /// Rows kept.
    pub retained: u64,
}

// ── Filter options ───────────────────────────────────────────────────────

/// Choices and defaults for the filter widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct regions, sorted.
    pub regions: Vec<String>,
    /// Region selected by default.
    pub default_region: Option<String>,
    /// Distinct severity levels, ascending. All are selected by default.
    pub severities: Vec<AccidentSeverity>,
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// Default year range (the full observed range).
    pub default_years: Option<YearRange>,
    /// Metrics the weather view can use with this table.
    pub metrics: Vec<WeatherMetric>,
}

impl FilterOptions {
    /// The filter the dashboard opens with, or `None` if the table is empty.
    #[must_use]
    pub fn default_filter(&self) -> Option<DashboardFilter> {
        Some(DashboardFilter {
            region: self.default_region.clone()?,
            severities: self.severities.iter().copied().collect(),
            years: self.default_years?,
        })
    }
}

// ── Aggregates ───────────────────────────────────────────────────────────

/// Number of accidents at one severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCount {
    /// Severity level.
    pub severity: AccidentSeverity,
    /// Number of accidents.
    pub count: u64,
}

/// A monthly time-series data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Month bucket (`"YYYY-MM"`).
    pub period: YearMonth,
    /// Number of accidents in the month.
    pub count: u64,
}

/// Number of accidents whose rounded metric value equals `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricFrequency {
    /// Rounded metric value.
    pub value: i64,
    /// Number of accidents.
    pub count: u64,
}

/// Per-month accident count joined with the mean of each weather metric.
///
/// A mean is `None` only when the metric's column is absent from the
/// dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyWeather {
    /// Month bucket.
    pub period: YearMonth,
    /// Number of accidents in the month.
    pub count: u64,
    /// Mean visibility in miles.
    pub mean_visibility_mi: Option<f64>,
    /// Mean temperature in Fahrenheit.
    pub mean_temperature_f: Option<f64>,
    /// Mean wind speed in mph.
    pub mean_wind_speed_mph: Option<f64>,
}

impl MonthlyWeather {
    /// The mean for `metric`.
    #[must_use]
    pub const fn mean(&self, metric: WeatherMetric) -> Option<f64> {
        match metric {
            WeatherMetric::Visibility => self.mean_visibility_mi,
            WeatherMetric::Temperature => self.mean_temperature_f,
            WeatherMetric::WindSpeed => self.mean_wind_speed_mph,
        }
    }
}

/// Number of accidents in a labelled value range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeCount {
    /// Range label (e.g. `"1-3 mi"`).
    pub label: String,
    /// Number of accidents.
    pub count: u64,
}

/// One point on the accident map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Severity, used for colouring.
    pub severity: AccidentSeverity,
}

/// Points for the map plus how they relate to the filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSample {
    /// Points to plot.
    pub points: Vec<MapPoint>,
    /// Number of located accidents before sampling.
    pub total: u64,
    /// Whether `points` is a sample of `total`.
    pub sampled: bool,
}

/// Frequency of rounded metric values, or why there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MetricFrequencies {
    /// Counts ascending by rounded value.
    Ready { values: Vec<MetricFrequency> },
    /// Outlier filtering removed every value.
    MetricCleaningEmpty,
    /// The dataset does not carry this metric.
    MetricUnavailable,
}

/// The weather chart's data.
///
/// `monthly` is computed from every filtered record without outlier
/// filtering, so it is filled even when `frequency` has no values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPanel {
    /// Metric the frequency view is keyed on.
    pub metric: WeatherMetric,
    pub frequency: MetricFrequencies,
    /// Monthly count and metric means, ascending by month.
    pub monthly: Vec<MonthlyWeather>,
}

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Filter the view was computed for.
    pub filter: DashboardFilter,
    /// Size of the filtered set.
    pub total: u64,
    /// Map points.
    pub map: MapSample,
    /// Severity distribution, ascending by severity.
    pub severity: Vec<SeverityCount>,
    /// Monthly trend, ascending by month.
    pub monthly_trend: Vec<TimeSeriesPoint>,
    /// Weather chart.
    pub weather: WeatherPanel,
    /// Visibility range distribution (empty without a visibility column).
    pub visibility_ranges: Vec<RangeCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_is_inclusive() {
        let range = YearRange::new(2019, 2021);
        assert!(range.contains(2019));
        assert!(range.contains(2021));
        assert!(!range.contains(2022));
        assert!(YearRange::single(2020).contains(2020));
        assert!(YearRange::new(2021, 2019).is_inverted());
    }

    #[test]
    fn default_thresholds() {
        let t = OutlierThresholds::default();
        let wind = t.rule_for(WeatherMetric::WindSpeed).unwrap();
        assert!(wind.keeps(99.0));
        assert!(!wind.keeps(100.0));
        let vis = t.rule_for(WeatherMetric::Visibility).unwrap();
        assert!(vis.keeps(20.0));
        assert!(!vis.keeps(20.5));
        assert!(t.rule_for(WeatherMetric::Temperature).is_none());
    }

    #[test]
    fn config_fills_defaults_from_partial_toml() {
        let config: DashboardConfig = toml::from_str(
            r#"
            sample_seed = 7
            rounding = "half_up"

            [thresholds.wind_speed_mph]
            max = 80
            "#,
        )
        .unwrap();

        assert_eq!(config.sample_seed, 7);
        assert_eq!(config.map_sample_cap, DEFAULT_MAP_SAMPLE_CAP);
        assert_eq!(config.default_region, "CA");
        assert_eq!(config.rounding, RoundingMode::HalfUp);
        let wind = config.thresholds.wind_speed_mph.unwrap();
        assert!((wind.max - 80.0).abs() < f64::EPSILON);
        assert!(!wind.inclusive);
        // Unspecified metrics keep their defaults.
        assert!(config.thresholds.visibility_mi.is_some());
    }

    #[test]
    fn weather_panel_serializes_with_status_tag() {
        let panel = WeatherPanel {
            metric: WeatherMetric::WindSpeed,
            frequency: MetricFrequencies::MetricCleaningEmpty,
            monthly: Vec::new(),
        };
        let json = serde_json::to_value(&panel).unwrap();
        assert_eq!(json["frequency"]["status"], "metricCleaningEmpty");
        assert_eq!(json["metric"], "wind_speed");

        let ready = MetricFrequencies::Ready {
            values: vec![MetricFrequency { value: 3, count: 2 }],
        };
        let json = serde_json::to_value(&ready).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["values"][0]["count"], 2);
    }

    #[test]
    fn default_filter_selects_everything() {
        let options = FilterOptions {
            regions: vec!["CA".to_string(), "TX".to_string()],
            default_region: Some("CA".to_string()),
            severities: vec![AccidentSeverity::MINOR, AccidentSeverity::SEVERE],
            years: vec![2019, 2020],
            default_years: Some(YearRange::new(2019, 2020)),
            metrics: WeatherMetric::all().to_vec(),
        };
        let filter = options.default_filter().unwrap();
        assert_eq!(filter.region, "CA");
        assert_eq!(filter.severities.len(), 2);
        assert_eq!(filter.years, YearRange::new(2019, 2020));
    }
}
