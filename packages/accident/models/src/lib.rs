#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident record, severity scale and calendar bucket types.
//!
//! These are the canonical types every stage of the dashboard pipeline
//! shares: the cleaner produces [`AccidentRecord`]s, the filter and the
//! aggregators only ever read them.

use std::str::FromStr;

use chrono::{Datelike as _, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Accident impact level on a small ordered integer scale.
///
/// The US Accidents dataset documents levels 1 (least impact on traffic)
/// through 4 (most), but any integer a source reports is kept so that no
/// row is lost to an unexpected level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccidentSeverity(u8);

impl AccidentSeverity {
    /// Level 1: short delay, little impact on traffic
    pub const MINOR: Self = Self(1);
    /// Level 2: moderate delay
    pub const MODERATE: Self = Self(2);
    /// Level 3: significant delay
    pub const SERIOUS: Self = Self(3);
    /// Level 4: long delay, road closures
    pub const SEVERE: Self = Self(4);

    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The levels the dataset documents, ascending.
    #[must_use]
    pub const fn known() -> &'static [Self] {
        &[Self::MINOR, Self::MODERATE, Self::SERIOUS, Self::SEVERE]
    }

    /// Short description of a documented level.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("minor"),
            2 => Some("moderate"),
            3 => Some("serious"),
            4 => Some("severe"),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccidentSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccidentSeverity {
    type Err = ParseSeverityError;

    /// Parses `"3"` as well as float-formatted integers such as `"3.0"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<u8>() {
            return Ok(Self(value));
        }
        match s.parse::<f64>() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(v) if v.fract() == 0.0 && (0.0..=255.0).contains(&v) => Ok(Self(v as u8)),
            _ => Err(ParseSeverityError {
                input: s.to_string(),
            }),
        }
    }
}

impl From<u8> for AccidentSeverity {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<AccidentSeverity> for u8 {
    fn from(severity: AccidentSeverity) -> Self {
        severity.0
    }
}

/// Error returned when a severity cell or parameter is not a non-negative
/// whole number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSeverityError {
    pub input: String,
}

impl std::fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity '{}': expected a whole number", self.input)
    }
}

impl std::error::Error for ParseSeverityError {}

/// A calendar month bucket, rendered as `"YYYY-MM"`.
///
/// Ordering is by `(year, month)`, which is the same as the lexical order
/// of the rendered key because the year is restricted to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a bucket for the given year and month.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is not 1-12 or `year` is not 0-9999.
    pub const fn new(year: i32, month: u32) -> Result<Self, InvalidYearMonthError> {
        if month < 1 || month > 12 || year < 0 || year > 9999 {
            return Err(InvalidYearMonthError::OutOfRange { year, month });
        }
        Ok(Self { year, month })
    }

    /// Returns the bucket containing the given timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp's year is outside 0-9999.
    pub fn from_datetime(dt: &NaiveDateTime) -> Result<Self, InvalidYearMonthError> {
        Self::new(dt.year(), dt.month())
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1-12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = InvalidYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidYearMonthError::Malformed(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(malformed());
        }
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let month = month.parse::<u32>().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = InvalidYearMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error returned for an invalid [`YearMonth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidYearMonthError {
    /// Year or month outside the supported range.
    OutOfRange {
        /// The year that was provided.
        year: i32,
        /// The month that was provided.
        month: u32,
    },
    /// The string is not in `YYYY-MM` form.
    Malformed(String),
}

impl std::fmt::Display for InvalidYearMonthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { year, month } => {
                write!(f, "year-month {year}-{month} out of range")
            }
            Self::Malformed(s) => write!(f, "invalid year-month '{s}': expected YYYY-MM"),
        }
    }
}

impl std::error::Error for InvalidYearMonthError {}

/// The fields an accident table is expected to carry, keyed by the column
/// names of the US Accidents export.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequiredField {
    /// Two-letter state code
    Region,
    /// Severity level
    Severity,
    /// Accident start timestamp
    StartTime,
    /// Free-text weather condition
    WeatherCondition,
    /// Visibility in miles
    Visibility,
    /// Temperature in Fahrenheit
    Temperature,
    /// Wind speed in mph
    WindSpeed,
    /// Start latitude (WGS84)
    Latitude,
    /// Start longitude (WGS84)
    Longitude,
}

impl RequiredField {
    /// Column header used by the raw dataset for this field.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Region => "State",
            Self::Severity => "Severity",
            Self::StartTime => "Start_Time",
            Self::WeatherCondition => "Weather_Condition",
            Self::Visibility => "Visibility(mi)",
            Self::Temperature => "Temperature(F)",
            Self::WindSpeed => "Wind_Speed(mph)",
            Self::Latitude => "Start_Lat",
            Self::Longitude => "Start_Lng",
        }
    }

    /// Key fields are the ones the filter stage cannot work without.
    #[must_use]
    pub const fn is_key(self) -> bool {
        matches!(self, Self::Region | Self::Severity | Self::StartTime)
    }

    /// Returns all variants of this enum in column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Region,
            Self::Severity,
            Self::StartTime,
            Self::WeatherCondition,
            Self::Visibility,
            Self::Temperature,
            Self::WindSpeed,
            Self::Latitude,
            Self::Longitude,
        ]
    }
}

/// Weather measurement that the weather view can be keyed on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeatherMetric {
    /// Visibility in miles
    Visibility,
    /// Temperature in Fahrenheit
    Temperature,
    /// Wind speed in mph
    WindSpeed,
}

impl WeatherMetric {
    /// The record field backing this metric.
    #[must_use]
    pub const fn field(self) -> RequiredField {
        match self {
            Self::Visibility => RequiredField::Visibility,
            Self::Temperature => RequiredField::Temperature,
            Self::WindSpeed => RequiredField::WindSpeed,
        }
    }

    /// Unit suffix for axis labels.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Visibility => "mi",
            Self::Temperature => "F",
            Self::WindSpeed => "mph",
        }
    }

    /// Reads this metric from a record.
    #[must_use]
    pub const fn value_of(self, record: &AccidentRecord) -> Option<f64> {
        match self {
            Self::Visibility => record.visibility_mi,
            Self::Temperature => record.temperature_f,
            Self::WindSpeed => record.wind_speed_mph,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Visibility, Self::Temperature, Self::WindSpeed]
    }
}

/// One cleaned accident event.
///
/// The key fields are always present. The remaining fields are `None`
/// only when the raw table lacked the column entirely; within a single
/// cleaned table an optional field is either present on every record or
/// on none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Region (state) code, e.g. `"CA"`.
    pub region: String,
    /// Severity level.
    pub severity: AccidentSeverity,
    /// When the accident started (local wall-clock time).
    pub start_time: NaiveDateTime,
    /// Calendar month bucket derived from `start_time`.
    pub year_month: YearMonth,
    /// Weather condition description (e.g. `"Light Rain"`).
    pub weather_condition: Option<String>,
    /// Visibility in miles.
    pub visibility_mi: Option<f64>,
    /// Temperature in Fahrenheit.
    pub temperature_f: Option<f64>,
    /// Wind speed in mph.
    pub wind_speed_mph: Option<f64>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
}

impl AccidentRecord {
    /// Calendar year of the accident.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year_month.year()
    }

    /// Calendar month of the accident, 1-12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.year_month.month()
    }

    /// `(latitude, longitude)` when both are known.
    #[must_use]
    pub const fn location(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}
