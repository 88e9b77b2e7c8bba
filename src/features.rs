//! Calendar fields, unit conversions and composite features

use chrono::{DateTime, Datelike, NaiveDate, Timelike};

/// Offset between Kelvin and degrees Celsius
pub const KELVIN_OFFSET: f64 = 273.15;
/// Millimetres per metre
pub const MM_PER_METRE: f64 = 1_000.0;

/// Calendar fields derived from a bucket start, narrowed to storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub date: NaiveDate,
    pub hour: i8,
    pub year: i16,
    pub month: i8,
    pub day: i8,
    pub dayofyear: i16,
    pub season: i8,
}

/// Derive calendar fields from seconds since the Unix epoch (UTC).
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn derive_calendar(epoch_seconds: i64) -> Option<CalendarFields> {
    let datetime = DateTime::from_timestamp(epoch_seconds, 0)?.naive_utc();
    let month = datetime.month();
    Some(CalendarFields {
        date: datetime.date(),
        hour: datetime.hour() as i8,
        year: i16::try_from(datetime.year()).ok()?,
        month: month as i8,
        day: datetime.day() as i8,
        dayofyear: datetime.ordinal() as i16,
        season: season_of_month(month),
    })
}

/// 1 = winter (Dec–Feb), 2 = spring, 3 = summer, 4 = autumn
#[must_use]
pub const fn season_of_month(month: u32) -> i8 {
    ((month % 12) / 3 + 1) as i8
}

#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

#[must_use]
pub fn metres_to_millimetres(metres: f64) -> f64 {
    metres * MM_PER_METRE
}

/// Total leaf area index from the high and low vegetation components
#[must_use]
pub fn total_leaf_area(lai_high: f64, lai_low: f64) -> f64 {
    lai_high + lai_low
}

/// Wind speed from its 10 m components
#[must_use]
pub fn wind_speed(u: f64, v: f64) -> f64 {
    (u * u + v * v).sqrt()
}

/// Days since 1970-01-01, the physical encoding of a Date column
#[must_use]
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    const EPOCH_DAYS_FROM_CE: i32 = 719_163;
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}
