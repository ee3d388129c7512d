//! Plain-text rendering of options and dashboard views.

use accident_dash_analytics_models::{DashboardView, FilterOptions, MetricFrequencies};
use accident_dash_dataset::CleanedDataset;

const BAR_WIDTH: usize = 40;

/// A bar of `#` scaled so that `max` fills [`BAR_WIDTH`] columns.
fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = usize::try_from(count.saturating_mul(BAR_WIDTH as u64) / max).unwrap_or(BAR_WIDTH);
    "#".repeat(width.max(usize::from(count > 0)))
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_options(dataset: &CleanedDataset, options: &FilterOptions) {
    let stats = dataset.table.stats;
    println!("Dataset:    {}", dataset.key);
    println!(
        "Records:    {} kept of {} ({} missing values, {} bad timestamps)",
        stats.retained, stats.input_rows, stats.missing_values, stats.bad_timestamps
    );
    println!("Regions:    {}", join(&options.regions));
    println!(
        "Default:    {}",
        options.default_region.as_deref().unwrap_or("-")
    );
    println!("Severities: {}", join(&options.severities));
    if let Some(years) = options.default_years {
        println!("Years:      {}-{}", years.start, years.end);
    }
    println!("Metrics:    {}", join(&options.metrics));
}

pub fn print_view(view: &DashboardView) {
    let filter = &view.filter;
    println!(
        "{} | severities {} | {}-{} | {} accidents",
        filter.region,
        join(&filter.severities.iter().collect::<Vec<_>>()),
        filter.years.start,
        filter.years.end,
        view.total
    );
    println!(
        "Map: {} of {} located points{}",
        view.map.points.len(),
        view.map.total,
        if view.map.sampled { " (sampled)" } else { "" }
    );

    println!("\nSeverity");
    let max = view.severity.iter().map(|c| c.count).max().unwrap_or(0);
    for c in &view.severity {
        println!("  {:>2} {:>8} {}", c.severity, c.count, bar(c.count, max));
    }

    println!("\nMonthly trend");
    let max = view.monthly_trend.iter().map(|p| p.count).max().unwrap_or(0);
    for p in &view.monthly_trend {
        println!("  {} {:>8} {}", p.period, p.count, bar(p.count, max));
    }

    println!();
    let weather = &view.weather;
    let metric = weather.metric;
    match &weather.frequency {
        MetricFrequencies::Ready { values } => {
            println!("{metric} ({})", metric.unit());
            let max = values.iter().map(|f| f.count).max().unwrap_or(0);
            for f in values {
                println!("  {:>5} {:>8} {}", f.value, f.count, bar(f.count, max));
            }
        }
        MetricFrequencies::MetricCleaningEmpty => {
            println!("{metric}: no values left after outlier filtering");
        }
        MetricFrequencies::MetricUnavailable => {
            println!("{metric}: not present in this dataset");
        }
    }

    println!("\nMonthly weather means");
    println!(
        "  {:<7} {:>8} {:>10} {:>8} {:>10}",
        "month", "count", "vis (mi)", "temp (F)", "wind (mph)"
    );
    let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    for m in &weather.monthly {
        println!(
            "  {:<7} {:>8} {:>10} {:>8} {:>10}",
            m.period.to_string(),
            m.count,
            cell(m.mean_visibility_mi),
            cell(m.mean_temperature_f),
            cell(m.mean_wind_speed_mph)
        );
    }

    if !view.visibility_ranges.is_empty() {
        println!("\nVisibility");
        let max = view.visibility_ranges.iter().map(|r| r.count).max().unwrap_or(0);
        for r in &view.visibility_ranges {
            println!("  {:<9} {:>8} {}", r.label, r.count, bar(r.count, max));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_to_the_maximum() {
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(5, 10).len(), BAR_WIDTH / 2);
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(3, 0), "");
    }

    #[test]
    fn tiny_counts_stay_visible() {
        assert_eq!(bar(1, 1_000_000), "#");
    }
}
