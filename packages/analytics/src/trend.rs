//! Monthly accident trend.

use std::collections::BTreeMap;

use accident_dash_accident_models::{AccidentRecord, YearMonth};
use accident_dash_analytics_models::TimeSeriesPoint;

/// Counts records per month bucket, ascending by bucket.
///
/// Months without accidents are not filled in.
#[must_use]
pub fn monthly_trend(records: &[&AccidentRecord]) -> Vec<TimeSeriesPoint> {
    let mut counts: BTreeMap<YearMonth, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.year_month).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(period, count)| TimeSeriesPoint { period, count })
        .collect()
}
