//! Weather views: metric frequency, monthly weather means and visibility
//! ranges.

use std::collections::BTreeMap;

use accident_dash_accident_models::{AccidentRecord, WeatherMetric, YearMonth};
use accident_dash_analytics_models::{
    MetricFrequency, MonthlyWeather, OutlierRule, OutlierThresholds, RangeCount, RoundingMode,
};

use crate::AnalyticsError;

/// Visibility ranges as `[low, high)` in miles, with their labels.
const VISIBILITY_RANGES: &[(f64, f64, &str)] = &[
    (0.0, 1.0, "0-1 mi"),
    (1.0, 3.0, "1-3 mi"),
    (3.0, 5.0, "3-5 mi"),
    (5.0, 10.0, "5-10 mi"),
    (10.0, 50.0, "10-50 mi"),
    (50.0, 100.0, "50+ mi"),
];

/// Rounds `value` to an integer bin.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_value(value: f64, mode: RoundingMode) -> i64 {
    let rounded = match mode {
        RoundingMode::HalfEven => value.round_ties_even(),
        RoundingMode::HalfUp => {
            let floor = value.floor();
            if value - floor >= 0.5 {
                floor + 1.0
            } else {
                floor
            }
        }
    };
    rounded as i64
}

/// Drops values rejected by `rule`; `None` keeps everything.
#[must_use]
pub fn retain_plausible(values: &[f64], rule: Option<OutlierRule>) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|v| rule.is_none_or(|rule| rule.keeps(*v)))
        .collect()
}

/// Frequency of each rounded value of `metric` across `records`, ascending
/// by value, after outlier filtering.
///
/// # Errors
///
/// * [`AnalyticsError::EmptyResult`] if `records` is empty.
/// * [`AnalyticsError::MetricUnavailable`] if the records do not carry the
///   metric.
/// * [`AnalyticsError::MetricCleaningEmpty`] if outlier filtering removed
///   every value.
pub fn metric_frequency(
    records: &[&AccidentRecord],
    metric: WeatherMetric,
    thresholds: &OutlierThresholds,
    rounding: RoundingMode,
) -> Result<Vec<MetricFrequency>, AnalyticsError> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyResult);
    }

    let values: Vec<f64> = records.iter().filter_map(|r| metric.value_of(r)).collect();
    if values.is_empty() {
        return Err(AnalyticsError::MetricUnavailable { metric });
    }

    let kept = retain_plausible(&values, thresholds.rule_for(metric));
    if kept.is_empty() {
        return Err(AnalyticsError::MetricCleaningEmpty { metric });
    }
    if kept.len() < values.len() {
        log::debug!(
            "Dropped {} {metric} outliers of {}",
            values.len() - kept.len(),
            values.len()
        );
    }

    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for value in kept {
        *counts.entry(round_value(value, rounding)).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(value, count)| MetricFrequency { value, count })
        .collect())
}

#[derive(Default)]
struct Mean {
    sum: f64,
    n: u64,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

#[derive(Default)]
struct MonthAccumulator {
    count: u64,
    visibility: Mean,
    temperature: Mean,
    wind_speed: Mean,
}

/// Per-month accident count and arithmetic mean of each weather metric,
/// ascending by month.
///
/// Means use every record in the month and are not rounded.
#[must_use]
pub fn monthly_weather(records: &[&AccidentRecord]) -> Vec<MonthlyWeather> {
    let mut months: BTreeMap<YearMonth, MonthAccumulator> = BTreeMap::new();
    for record in records {
        let acc = months.entry(record.year_month).or_default();
        acc.count += 1;
        acc.visibility.add(record.visibility_mi);
        acc.temperature.add(record.temperature_f);
        acc.wind_speed.add(record.wind_speed_mph);
    }

    months
        .into_iter()
        .map(|(period, acc)| MonthlyWeather {
            period,
            count: acc.count,
            mean_visibility_mi: acc.visibility.value(),
            mean_temperature_f: acc.temperature.value(),
            mean_wind_speed_mph: acc.wind_speed.value(),
        })
        .collect()
}

/// Accident counts per fixed visibility range, in range order.
///
/// Every range is listed, including empty ones. Values outside all ranges
/// are not counted. Returns an empty list when the records carry no
/// visibility.
#[must_use]
pub fn visibility_ranges(records: &[&AccidentRecord]) -> Vec<RangeCount> {
    if records.iter().all(|r| r.visibility_mi.is_none()) {
        return Vec::new();
    }

    let mut counts = vec![0u64; VISIBILITY_RANGES.len()];
    for visibility in records.iter().filter_map(|r| r.visibility_mi) {
        if let Some(i) = VISIBILITY_RANGES
            .iter()
            .position(|(low, high, _)| *low <= visibility && visibility < *high)
        {
            counts[i] += 1;
        }
    }

    VISIBILITY_RANGES
        .iter()
        .zip(counts)
        .map(|((_, _, label), count)| RangeCount {
            label: (*label).to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::record;

    fn with_wind(values: &[f64]) -> Vec<AccidentRecord> {
        values
            .iter()
            .map(|v| {
                let mut r = record("CA", 2, 2021, 1);
                r.wind_speed_mph = Some(*v);
                r
            })
            .collect()
    }

    #[test]
    fn wind_cutoff_drops_values_at_or_above_100() {
        let rule = OutlierThresholds::default().rule_for(WeatherMetric::WindSpeed);
        assert_eq!(retain_plausible(&[10.0, 99.0, 150.0], rule), vec![10.0, 99.0]);
        assert_eq!(retain_plausible(&[100.0], rule), Vec::<f64>::new());
    }

    #[test]
    fn wind_frequency_excludes_outliers() {
        let records = with_wind(&[10.0, 99.0, 150.0]);
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        let freq = metric_frequency(
            &refs,
            WeatherMetric::WindSpeed,
            &OutlierThresholds::default(),
            RoundingMode::HalfEven,
        )
        .unwrap();
        assert_eq!(
            freq,
            vec![
                MetricFrequency {
                    value: 10,
                    count: 1
                },
                MetricFrequency {
                    value: 99,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn visibility_keeps_exactly_twenty() {
        let mut records = with_wind(&[1.0, 1.0, 1.0]);
        records[0].visibility_mi = Some(20.0);
        records[1].visibility_mi = Some(20.4);
        records[2].visibility_mi = Some(2.6);
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        let freq = metric_frequency(
            &refs,
            WeatherMetric::Visibility,
            &OutlierThresholds::default(),
            RoundingMode::HalfEven,
        )
        .unwrap();
        let values: Vec<i64> = freq.iter().map(|f| f.value).collect();
        assert_eq!(values, vec![3, 20]);
    }

    #[test]
    fn temperature_is_not_filtered() {
        let mut records = with_wind(&[1.0, 1.0]);
        records[0].temperature_f = Some(-40.0);
        records[1].temperature_f = Some(170.0);
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        let freq = metric_frequency(
            &refs,
            WeatherMetric::Temperature,
            &OutlierThresholds::default(),
            RoundingMode::HalfEven,
        )
        .unwrap();
        assert_eq!(freq.iter().map(|f| f.count).sum::<u64>(), 2);
    }

    #[test]
    fn groups_by_rounded_value() {
        let records = with_wind(&[4.6, 5.0, 5.4, 7.0]);
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        let freq = metric_frequency(
            &refs,
            WeatherMetric::WindSpeed,
            &OutlierThresholds::default(),
            RoundingMode::HalfEven,
        )
        .unwrap();
        assert_eq!(
            freq,
            vec![
                MetricFrequency { value: 5, count: 3 },
                MetricFrequency { value: 7, count: 1 },
            ]
        );
    }

    #[test]
    fn rounding_modes_differ_on_ties() {
        assert_eq!(round_value(2.5, RoundingMode::HalfEven), 2);
        assert_eq!(round_value(3.5, RoundingMode::HalfEven), 4);
        assert_eq!(round_value(2.5, RoundingMode::HalfUp), 3);
        assert_eq!(round_value(-2.5, RoundingMode::HalfUp), -2);
        assert_eq!(round_value(-2.5, RoundingMode::HalfEven), -2);
        assert_eq!(round_value(2.4, RoundingMode::HalfUp), 2);
    }

    #[test]
    fn half_up_is_exact_near_ties_and_for_large_values() {
        assert_eq!(round_value(0.499_999_999_999_999_94, RoundingMode::HalfUp), 0);
        assert_eq!(round_value(-0.5, RoundingMode::HalfUp), 0);
        assert_eq!(round_value(-0.6, RoundingMode::HalfUp), -1);
        let big = 4_503_599_627_370_497.0; // 2^52 + 1
        assert_eq!(round_value(big, RoundingMode::HalfUp), 4_503_599_627_370_497);
    }

    #[test]
    fn all_outliers_is_metric_cleaning_empty() {
        let records = with_wind(&[120.0, 250.0]);
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        let result = metric_frequency(
            &refs,
            WeatherMetric::WindSpeed,
            &OutlierThresholds::default(),
            RoundingMode::HalfEven,
        );
        assert_eq!(
            result,
            Err(AnalyticsError::MetricCleaningEmpty {
                metric: WeatherMetric::WindSpeed
            })
        );
    }

    #[test]
    fn missing_column_and_empty_input_are_distinct() {
        let mut records = with_wind(&[1.0]);
        records[0].wind_speed_mph = None;
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        let thresholds = OutlierThresholds::default();

        assert_eq!(
            metric_frequency(&refs, WeatherMetric::WindSpeed, &thresholds, RoundingMode::HalfEven),
            Err(AnalyticsError::MetricUnavailable {
                metric: WeatherMetric::WindSpeed
            })
        );
        assert_eq!(
            metric_frequency(&[], WeatherMetric::WindSpeed, &thresholds, RoundingMode::HalfEven),
            Err(AnalyticsError::EmptyResult)
        );
    }

    #[test]
    fn monthly_means_are_unrounded() {
        let mut records = vec![
            record("CA", 1, 2021, 1),
            record("CA", 1, 2021, 1),
            record("CA", 1, 2021, 3),
        ];
        records[0].visibility_mi = Some(10.0);
        records[1].visibility_mi = Some(2.5);
        records[0].temperature_f = Some(50.0);
        records[1].temperature_f = Some(51.0);
        records[0].wind_speed_mph = Some(3.0);
        records[1].wind_speed_mph = Some(4.0);
        let refs: Vec<&AccidentRecord> = records.iter().collect();

        let monthly = monthly_weather(&refs);
        assert_eq!(monthly.len(), 2);

        let jan = &monthly[0];
        assert_eq!(jan.period.to_string(), "2021-01");
        assert_eq!(jan.count, 2);
        assert_eq!(jan.mean_visibility_mi, Some(6.25));
        assert_eq!(jan.mean_temperature_f, Some(50.5));
        assert_eq!(jan.mean_wind_speed_mph, Some(3.5));
        assert_eq!(jan.mean(WeatherMetric::Visibility), Some(6.25));

        assert_eq!(monthly[1].period.to_string(), "2021-03");
        assert_eq!(monthly[1].count, 1);
    }

    #[test]
    fn monthly_means_absent_without_column() {
        let mut records = vec![record("CA", 1, 2021, 1)];
        records[0].temperature_f = None;
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        let monthly = monthly_weather(&refs);
        assert_eq!(monthly[0].mean_temperature_f, None);
        assert!(monthly[0].mean_visibility_mi.is_some());
    }

    #[test]
    fn visibility_ranges_are_half_open() {
        let mut records: Vec<AccidentRecord> = (0..5).map(|_| record("CA", 1, 2021, 1)).collect();
        records[0].visibility_mi = Some(0.0);
        records[1].visibility_mi = Some(1.0);
        records[2].visibility_mi = Some(9.99);
        records[3].visibility_mi = Some(60.0);
        records[4].visibility_mi = Some(140.0);
        let refs: Vec<&AccidentRecord> = records.iter().collect();

        let ranges = visibility_ranges(&refs);
        let counts: Vec<(&str, u64)> = ranges.iter().map(|r| (r.label.as_str(), r.count)).collect();
        assert_eq!(
            counts,
            vec![
                ("0-1 mi", 1),
                ("1-3 mi", 1),
                ("3-5 mi", 0),
                ("5-10 mi", 1),
                ("10-50 mi", 0),
                ("50+ mi", 1),
            ]
        );
    }

    #[test]
    fn visibility_ranges_empty_without_column() {
        let mut records = vec![record("CA", 1, 2021, 1)];
        records[0].visibility_mi = None;
        let refs: Vec<&AccidentRecord> = records.iter().collect();
        assert!(visibility_ranges(&refs).is_empty());
    }
}
