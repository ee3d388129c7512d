//! Filter widget choices and default resolution.

use std::collections::BTreeSet;

use accident_dash_accident_models::{AccidentSeverity, WeatherMetric};
use accident_dash_analytics_models::{DashboardFilter, FilterOptions, FilterSelection, YearRange};

use crate::AnalyticsError;
use crate::clean::CleanedTable;

/// Derives the choices and defaults for the filter widgets.
///
/// The default region is `preferred_region` when the table has it, else
/// the alphabetically first region.
#[must_use]
pub fn filter_options(table: &CleanedTable, preferred_region: &str) -> FilterOptions {
    let regions: BTreeSet<&str> = table.records.iter().map(|r| r.region.as_str()).collect();
    let severities: BTreeSet<AccidentSeverity> = table.records.iter().map(|r| r.severity).collect();
    let years: BTreeSet<i32> = table.records.iter().map(|r| r.year()).collect();

    let default_region = if regions.contains(preferred_region) {
        Some(preferred_region.to_string())
    } else {
        regions.first().map(ToString::to_string)
    };
    let default_years = years
        .first()
        .zip(years.last())
        .map(|(start, end)| YearRange::new(*start, *end));

    FilterOptions {
        regions: regions.into_iter().map(ToString::to_string).collect(),
        default_region,
        severities: severities.into_iter().collect(),
        years: years.into_iter().collect(),
        default_years,
        metrics: WeatherMetric::all()
            .iter()
            .copied()
            .filter(|m| table.schema.has(m.field()))
            .collect(),
    }
}

/// Completes a partial selection with the defaults from `options`.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyResult`] when the table is empty (there
/// are no defaults to fall back on) and
/// [`AnalyticsError::InvalidFilter`] when an explicit severity list is
/// empty.
pub fn resolve_filter(
    options: &FilterOptions,
    selection: &FilterSelection,
) -> Result<DashboardFilter, AnalyticsError> {
    let defaults = options.default_filter().ok_or(AnalyticsError::EmptyResult)?;

    let severities = match &selection.severities {
        Some(list) if list.is_empty() => {
            return Err(AnalyticsError::InvalidFilter {
                message: "select at least one severity level".to_string(),
            });
        }
        Some(list) => list.iter().copied().collect(),
        None => defaults.severities,
    };

    Ok(DashboardFilter {
        region: selection.region.clone().unwrap_or(defaults.region),
        severities,
        years: YearRange::new(
            selection.year_from.unwrap_or(defaults.years.start),
            selection.year_to.unwrap_or(defaults.years.end),
        ),
    })
}

#[cfg(test)]
mod tests {
    use accident_dash_accident_models::RequiredField;
    use accident_dash_analytics_models::{CleanStats, SchemaReport, SchemaStatus};

    use super::*;
    use crate::filter::tests::record;

    fn table(records: Vec<accident_dash_accident_models::AccidentRecord>) -> CleanedTable {
        CleanedTable {
            records,
            schema: SchemaReport {
                status: SchemaStatus::Partial {
                    missing: vec![RequiredField::WindSpeed],
                },
                present: RequiredField::all()
                    .iter()
                    .copied()
                    .filter(|f| *f != RequiredField::WindSpeed)
                    .collect(),
            },
            stats: CleanStats::default(),
        }
    }

    #[test]
    fn prefers_ca_when_present() {
        let t = table(vec![
            record("TX", 2, 2018, 1),
            record("CA", 3, 2021, 1),
            record("AZ", 2, 2019, 1),
        ]);
        let options = filter_options(&t, "CA");
        assert_eq!(options.regions, vec!["AZ", "CA", "TX"]);
        assert_eq!(options.default_region.as_deref(), Some("CA"));
        assert_eq!(
            options.severities,
            vec![AccidentSeverity::MODERATE, AccidentSeverity::SERIOUS]
        );
        assert_eq!(options.years, vec![2018, 2019, 2021]);
        assert_eq!(options.default_years, Some(YearRange::new(2018, 2021)));
        assert_eq!(
            options.metrics,
            vec![WeatherMetric::Visibility, WeatherMetric::Temperature]
        );
    }

    #[test]
    fn falls_back_to_first_region() {
        let t = table(vec![record("TX", 2, 2018, 1), record("AZ", 2, 2019, 1)]);
        let options = filter_options(&t, "CA");
        assert_eq!(options.default_region.as_deref(), Some("AZ"));
    }

    #[test]
    fn empty_table_has_no_defaults() {
        let options = filter_options(&table(Vec::new()), "CA");
        assert!(options.regions.is_empty());
        assert_eq!(options.default_region, None);
        assert_eq!(
            resolve_filter(&options, &FilterSelection::default()),
            Err(AnalyticsError::EmptyResult)
        );
    }

    #[test]
    fn resolve_fills_unset_parts() {
        let t = table(vec![record("CA", 1, 2018, 1), record("CA", 4, 2022, 1)]);
        let options = filter_options(&t, "CA");
        let selection = FilterSelection {
            year_from: Some(2020),
            ..FilterSelection::default()
        };
        let filter = resolve_filter(&options, &selection).unwrap();
        assert_eq!(filter.region, "CA");
        assert_eq!(filter.years, YearRange::new(2020, 2022));
        assert_eq!(filter.severities.len(), 2);
    }

    #[test]
    fn resolve_rejects_empty_severity_list() {
        let t = table(vec![record("CA", 1, 2018, 1)]);
        let options = filter_options(&t, "CA");
        let selection = FilterSelection {
            severities: Some(Vec::new()),
            ..FilterSelection::default()
        };
        assert!(matches!(
            resolve_filter(&options, &selection),
            Err(AnalyticsError::InvalidFilter { .. })
        ));
    }
}
