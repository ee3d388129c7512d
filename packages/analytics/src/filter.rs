//! Region / severity / year selection over the cleaned table.

use accident_dash_accident_models::AccidentRecord;
use accident_dash_analytics_models::DashboardFilter;

use crate::AnalyticsError;

/// Rejects filters that cannot match anything by construction.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] for an inverted year range or
/// an empty region code.
pub fn validate(filter: &DashboardFilter) -> Result<(), AnalyticsError> {
    if filter.region.trim().is_empty() {
        return Err(AnalyticsError::InvalidFilter {
            message: "region must not be empty".to_string(),
        });
    }
    if filter.years.is_inverted() {
        return Err(AnalyticsError::InvalidFilter {
            message: format!(
                "year range {}..={} is inverted",
                filter.years.start, filter.years.end
            ),
        });
    }
    Ok(())
}

/// Whether a single record passes the filter.
#[must_use]
pub fn matches(record: &AccidentRecord, filter: &DashboardFilter) -> bool {
    record.region == filter.region
        && filter.severities.contains(&record.severity)
        && filter.years.contains(record.year())
}

/// Returns the records passing `filter`, in their original order.
#[must_use]
pub fn apply<'a>(records: &'a [AccidentRecord], filter: &DashboardFilter) -> Vec<&'a AccidentRecord> {
    records.iter().filter(|r| matches(r, filter)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use accident_dash_accident_models::{AccidentSeverity, YearMonth};
    use accident_dash_analytics_models::YearRange;
    use chrono::NaiveDate;

    use super::*;

    /// Builds a fully populated record for tests across the crate.
    pub(crate) fn record(region: &str, severity: u8, year: i32, month: u32) -> AccidentRecord {
        let start_time = NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        AccidentRecord {
            region: region.to_string(),
            severity: AccidentSeverity::new(severity),
            start_time,
            year_month: YearMonth::new(year, month).unwrap(),
            weather_condition: Some("Clear".to_string()),
            visibility_mi: Some(10.0),
            temperature_f: Some(60.0),
            wind_speed_mph: Some(5.0),
            latitude: Some(34.0),
            longitude: Some(-118.0),
        }
    }

    fn all_severities() -> BTreeSet<AccidentSeverity> {
        AccidentSeverity::known().iter().copied().collect()
    }

    fn table() -> Vec<AccidentRecord> {
        vec![
            record("CA", 1, 2019, 3),
            record("TX", 2, 2019, 4),
            record("CA", 2, 2020, 1),
            record("CA", 4, 2021, 7),
            record("CA", 3, 2022, 2),
        ]
    }

    #[test]
    fn filters_by_region_severity_and_years() {
        let records = table();
        let filter = DashboardFilter {
            region: "CA".to_string(),
            severities: [AccidentSeverity::MODERATE, AccidentSeverity::SEVERE]
                .into_iter()
                .collect(),
            years: YearRange::new(2020, 2021),
        };
        let out = apply(&records, &filter);
        assert_eq!(out, vec![&records[2], &records[3]]);
    }

    #[test]
    fn full_selection_equals_region_restriction() {
        let records = table();
        let filter = DashboardFilter {
            region: "CA".to_string(),
            severities: all_severities(),
            years: YearRange::new(2019, 2022),
        };
        let expected = records.iter().filter(|r| r.region == "CA").count();
        assert_eq!(apply(&records, &filter).len(), expected);
    }

    #[test]
    fn single_year_range() {
        let records = table();
        let filter = DashboardFilter {
            region: "CA".to_string(),
            severities: all_severities(),
            years: YearRange::single(2021),
        };
        let out = apply(&records, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].year(), 2021);
    }

    #[test]
    fn is_pure_and_order_preserving() {
        let records = table();
        let filter = DashboardFilter {
            region: "CA".to_string(),
            severities: all_severities(),
            years: YearRange::new(2019, 2022),
        };
        let a = apply(&records, &filter);
        let b = apply(&records, &filter);
        assert_eq!(a, b);
        let years: Vec<i32> = a.iter().map(|r| r.year()).collect();
        assert_eq!(years, vec![2019, 2020, 2021, 2022]);
    }

    #[test]
    fn validate_rejects_inverted_range_and_blank_region() {
        let mut filter = DashboardFilter {
            region: "CA".to_string(),
            severities: all_severities(),
            years: YearRange::new(2022, 2019),
        };
        assert!(matches!(
            validate(&filter),
            Err(AnalyticsError::InvalidFilter { .. })
        ));
        filter.years = YearRange::single(2020);
        assert!(validate(&filter).is_ok());
        filter.region = " ".to_string();
        assert!(validate(&filter).is_err());
    }
}
