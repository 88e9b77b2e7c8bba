//! CF-convention time decoding
//!
//! Time coordinates in ERA5 NetCDF exports are stored as numbers with a
//! `units` attribute such as `"hours since 1900-01-01 00:00:00.0"`. Forecast
//! steps carry a bare unit (`"hours"`) or the same `since` form.

use chrono::{NaiveDate, NaiveDateTime};

/// Decoded `"<unit> since <reference>"` attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    /// Length of one unit in seconds
    pub seconds_per_unit: f64,
    /// Reference instant in seconds since the Unix epoch
    pub reference: i64,
}

impl TimeUnits {
    /// Convert a raw coordinate value into seconds since the Unix epoch
    #[must_use]
    pub fn to_epoch_seconds(&self, value: f64) -> i64 {
        self.reference + (value * self.seconds_per_unit).round() as i64
    }
}

/// Seconds per unit for a CF duration unit name
pub fn duration_unit_seconds(unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1.0),
        "min" | "mins" | "minute" | "minutes" => Some(60.0),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3_600.0),
        "d" | "day" | "days" => Some(86_400.0),
        _ => None,
    }
}

/// Parse a `"<unit> since <reference>"` string
pub fn parse_time_units(units: &str) -> Option<TimeUnits> {
    let (unit, reference) = units.split_once(" since ")?;
    let seconds_per_unit = duration_unit_seconds(unit)?;
    let reference = parse_reference(reference)?;
    Some(TimeUnits {
        seconds_per_unit,
        reference: reference.and_utc().timestamp(),
    })
}

/// Parse a step unit: either a bare duration unit or the `since` form
pub fn parse_step_units(units: &str) -> Option<f64> {
    match units.split_once(" since ") {
        Some((unit, _)) => duration_unit_seconds(unit),
        None => duration_unit_seconds(units),
    }
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let trimmed = reference
        .trim()
        .trim_end_matches('Z')
        .trim_end_matches(" UTC")
        .trim_end_matches("+00:00")
        .trim();

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
