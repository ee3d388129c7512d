//! Raw table to typed accident records.
//!
//! Restricts the raw table to the required columns that are present, drops
//! rows with a missing (or unparseable) value in any of them, parses the
//! start timestamp and derives the month bucket. The raw table is only
//! borrowed.

use accident_dash_accident_models::{AccidentRecord, AccidentSeverity, RequiredField, YearMonth};
use accident_dash_analytics_models::{CleanStats, SchemaReport};
use accident_dash_source::RawTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::schema;

/// Format used when rendering timestamps back into raw form.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Naive timestamp layouts accepted in the start-time column, tried in
/// order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses a start timestamp.
///
/// Accepts the layouts in the US Accidents export (with or without
/// fractional seconds), `T`-separated ISO 8601, RFC 3339 with an offset
/// (the offset is discarded and the wall-clock time kept) and bare dates
/// (midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a numeric cell; `NaN` counts as missing.
fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// The cleaned, immutable accident table.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    /// Retained records, in raw row order.
    pub records: Vec<AccidentRecord>,
    /// Which required columns were present.
    pub schema: SchemaReport,
    /// Row counts per drop reason.
    pub stats: CleanStats,
}

impl CleanedTable {
    /// Number of retained records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were retained.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders the table back into the raw column format, restricted to
    /// the columns that were present.
    ///
    /// Cleaning the result yields the same records and schema.
    #[must_use]
    pub fn to_raw(&self) -> RawTable {
        let headers = self
            .schema
            .present
            .iter()
            .map(|f| f.column_name().to_string())
            .collect();

        let rows = self
            .records
            .iter()
            .map(|record| {
                self.schema
                    .present
                    .iter()
                    .map(|field| render_field(record, *field))
                    .collect()
            })
            .collect();

        RawTable::new(headers, rows)
    }
}

fn render_field(record: &AccidentRecord, field: RequiredField) -> String {
    let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    match field {
        RequiredField::Region => record.region.clone(),
        RequiredField::Severity => record.severity.to_string(),
        RequiredField::StartTime => record.start_time.format(TIMESTAMP_FORMAT).to_string(),
        RequiredField::WeatherCondition => record.weather_condition.clone().unwrap_or_default(),
        RequiredField::Visibility => number(record.visibility_mi),
        RequiredField::Temperature => number(record.temperature_f),
        RequiredField::WindSpeed => number(record.wind_speed_mph),
        RequiredField::Latitude => number(record.latitude),
        RequiredField::Longitude => number(record.longitude),
    }
}

/// Column positions of the required fields within the raw table.
struct Columns {
    region: usize,
    severity: usize,
    start_time: usize,
    weather_condition: Option<usize>,
    visibility: Option<usize>,
    temperature: Option<usize>,
    wind_speed: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl Columns {
    fn resolve(raw: &RawTable) -> Option<Self> {
        let idx = |field: RequiredField| raw.column_index(field.column_name());
        Some(Self {
            region: idx(RequiredField::Region)?,
            severity: idx(RequiredField::Severity)?,
            start_time: idx(RequiredField::StartTime)?,
            weather_condition: idx(RequiredField::WeatherCondition),
            visibility: idx(RequiredField::Visibility),
            temperature: idx(RequiredField::Temperature),
            wind_speed: idx(RequiredField::WindSpeed),
            latitude: idx(RequiredField::Latitude),
            longitude: idx(RequiredField::Longitude),
        })
    }
}

enum DropReason {
    MissingValue,
    BadTimestamp,
}

/// Reads an optional numeric column: `Ok(None)` when the column is absent,
/// `Err` when it is present but the cell is missing or not a number.
fn optional_number(
    raw: &RawTable,
    row: usize,
    col: Option<usize>,
) -> Result<Option<f64>, DropReason> {
    col.map_or(Ok(None), |col| {
        raw.value(row, col)
            .and_then(parse_number)
            .map(Some)
            .ok_or(DropReason::MissingValue)
    })
}

fn clean_row(raw: &RawTable, row: usize, cols: &Columns) -> Result<AccidentRecord, DropReason> {
    let region = raw.value(row, cols.region).ok_or(DropReason::MissingValue)?;
    let severity = raw
        .value(row, cols.severity)
        .and_then(|s| s.parse::<AccidentSeverity>().ok())
        .ok_or(DropReason::MissingValue)?;
    let start_time = raw.value(row, cols.start_time).ok_or(DropReason::MissingValue)?;
    let weather_condition = cols
        .weather_condition
        .map_or(Ok(None), |col| {
            raw.value(row, col)
                .map(|s| Some(s.to_string()))
                .ok_or(DropReason::MissingValue)
        })?;
    let visibility_mi = optional_number(raw, row, cols.visibility)?;
    let temperature_f = optional_number(raw, row, cols.temperature)?;
    let wind_speed_mph = optional_number(raw, row, cols.wind_speed)?;
    let latitude = optional_number(raw, row, cols.latitude)?;
    let longitude = optional_number(raw, row, cols.longitude)?;

    let start_time = parse_timestamp(start_time).ok_or(DropReason::BadTimestamp)?;
    let year_month =
        YearMonth::from_datetime(&start_time).map_err(|_| DropReason::BadTimestamp)?;

    Ok(AccidentRecord {
        region: region.to_string(),
        severity,
        start_time,
        year_month,
        weather_condition,
        visibility_mi,
        temperature_f,
        wind_speed_mph,
        latitude,
        longitude,
    })
}

/// Cleans a raw table.
///
/// A table missing a key column yields an empty result whose
/// [`SchemaReport`] says why; callers surface that as "no data" instead of
/// failing.
#[must_use]
pub fn clean(raw: &RawTable) -> CleanedTable {
    let schema = schema::validate(&raw.headers);
    let mut stats = CleanStats {
        input_rows: raw.len() as u64,
        ..CleanStats::default()
    };

    let Some(cols) = Columns::resolve(raw).filter(|_| schema.is_usable()) else {
        log::warn!("Raw table is missing key columns: {:?}", schema.status);
        return CleanedTable {
            records: Vec::new(),
            schema,
            stats,
        };
    };

    let mut records = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        match clean_row(raw, row, &cols) {
            Ok(record) => records.push(record),
            Err(DropReason::MissingValue) => stats.missing_values += 1,
            Err(DropReason::BadTimestamp) => stats.bad_timestamps += 1,
        }
    }
    stats.retained = records.len() as u64;

    log::debug!(
        "Cleaned {} rows: kept {}, dropped {} with missing values and {} with bad timestamps",
        stats.input_rows,
        stats.retained,
        stats.missing_values,
        stats.bad_timestamps
    );

    CleanedTable {
        records,
        schema,
        stats,
    }
}
