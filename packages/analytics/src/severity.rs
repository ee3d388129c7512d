//! Severity distribution.

use std::collections::BTreeMap;

use accident_dash_accident_models::{AccidentRecord, AccidentSeverity};
use accident_dash_analytics_models::SeverityCount;

/// Counts records per severity level, ascending by level.
///
/// Only levels that occur are listed; there are no zero entries.
#[must_use]
pub fn severity_distribution(records: &[&AccidentRecord]) -> Vec<SeverityCount> {
    let mut counts: BTreeMap<AccidentSeverity, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.severity).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(severity, count)| SeverityCount { severity, count })
        .collect()
}
