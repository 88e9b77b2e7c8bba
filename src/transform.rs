//! Merge of the two aggregates and derivation of the output table
//!
//! The instant and accumulated aggregates are inner-joined on
//! (latitude, longitude, bucket). Buckets that only one side has are dropped.
//! Each surviving row gets calendar fields, unit conversions and the
//! `lai_total` / `ws_mean` composites.

use crate::aggregation::{AggregatedFrame, BucketKey};
use crate::errors::{EtlError, Result};
use crate::features::{
    derive_calendar, kelvin_to_celsius, metres_to_millimetres, total_leaf_area, wind_speed,
    CalendarFields,
};
use tracing::debug;

/// Output column order of the clean table
pub const OUTPUT_COLUMNS: [&str; 23] = [
    "latitude",
    "longitude",
    "t2m_mean",
    "t2m_max",
    "t2m_min",
    "d2m_mean",
    "skt_mean",
    "sp_mean",
    "blh_mean",
    "tcc_mean",
    "soil_moisture",
    "tp_sum",
    "e_sum",
    "ssrd_sum",
    "date",
    "hour",
    "year",
    "month",
    "day",
    "dayofyear",
    "season",
    "lai_total",
    "ws_mean",
];

/// One row of the final table, in output units
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// °C
    pub t2m_mean: f64,
    pub t2m_max: f64,
    pub t2m_min: f64,
    pub d2m_mean: f64,
    pub skt_mean: f64,
    /// Pa
    pub sp_mean: f64,
    /// m
    pub blh_mean: f64,
    /// fraction
    pub tcc_mean: f64,
    /// m³/m³
    pub soil_moisture: f64,
    /// mm
    pub tp_sum: f64,
    /// mm
    pub e_sum: f64,
    /// J/m²
    pub ssrd_sum: f64,
    pub calendar: CalendarFields,
    /// m²/m²
    pub lai_total: f64,
    /// m/s
    pub ws_mean: f64,
}

/// Final table for one year, sorted by (latitude, longitude, bucket)
#[derive(Debug, Clone, Default)]
pub struct CleanTable {
    pub records: Vec<CleanRecord>,
}

impl CleanTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Row present in both aggregates
#[derive(Debug, Clone, Copy)]
pub struct MergedRow<'a> {
    pub key: BucketKey,
    pub instant: &'a [f64],
    pub accumulated: &'a [f64],
}

/// Inner join on (latitude, longitude, bucket), in key order
pub fn merge_inner<'a>(
    instant: &'a AggregatedFrame,
    accumulated: &'a AggregatedFrame,
) -> Vec<MergedRow<'a>> {
    instant
        .rows
        .iter()
        .filter_map(|(key, instant_row)| {
            accumulated.rows.get(key).map(|accumulated_row| MergedRow {
                key: *key,
                instant: instant_row,
                accumulated: accumulated_row,
            })
        })
        .collect()
}

/// Column positions looked up once per table
struct Columns {
    t2m_mean: usize,
    t2m_max: usize,
    t2m_min: usize,
    d2m_mean: usize,
    skt_mean: usize,
    sp_mean: usize,
    blh_mean: usize,
    tcc_mean: usize,
    soil_moisture: usize,
    lai_hv: usize,
    lai_lv: usize,
    u10: usize,
    v10: usize,
    tp_sum: usize,
    e_sum: usize,
    ssrd_sum: usize,
}

fn column(frame: &AggregatedFrame, name: &str) -> Result<usize> {
    frame.column_index(name).ok_or_else(|| {
        EtlError::schema(format!(
            "aggregated {} frame has no column '{}'",
            frame.step_type, name
        ))
    })
}

impl Columns {
    fn resolve(instant: &AggregatedFrame, accumulated: &AggregatedFrame) -> Result<Self> {
        Ok(Self {
            t2m_mean: column(instant, "t2m_mean")?,
            t2m_max: column(instant, "t2m_max")?,
            t2m_min: column(instant, "t2m_min")?,
            d2m_mean: column(instant, "d2m_mean")?,
            skt_mean: column(instant, "skt_mean")?,
            sp_mean: column(instant, "sp_mean")?,
            blh_mean: column(instant, "blh_mean")?,
            tcc_mean: column(instant, "tcc_mean")?,
            soil_moisture: column(instant, "soil_moisture")?,
            lai_hv: column(instant, "lai_hv")?,
            lai_lv: column(instant, "lai_lv")?,
            u10: column(instant, "u10")?,
            v10: column(instant, "v10")?,
            tp_sum: column(accumulated, "tp_sum")?,
            e_sum: column(accumulated, "e_sum")?,
            ssrd_sum: column(accumulated, "ssrd_sum")?,
        })
    }
}

/// Join the aggregates and derive every output column
pub fn build_clean_table(
    instant: &AggregatedFrame,
    accumulated: &AggregatedFrame,
) -> Result<CleanTable> {
    let cols = Columns::resolve(instant, accumulated)?;
    let merged = merge_inner(instant, accumulated);

    debug!(
        instant_groups = instant.len(),
        accumulated_groups = accumulated.len(),
        merged = merged.len(),
        "inner join on latitude, longitude, bucket"
    );

    let records = merged
        .iter()
        .map(|row| {
            let calendar = derive_calendar(row.key.bucket).ok_or_else(|| {
                EtlError::schema(format!("bucket timestamp {} out of range", row.key.bucket))
            })?;
            let i = row.instant;
            let a = row.accumulated;
            Ok(CleanRecord {
                latitude: row.key.latitude(),
                longitude: row.key.longitude(),
                t2m_mean: kelvin_to_celsius(i[cols.t2m_mean]),
                t2m_max: kelvin_to_celsius(i[cols.t2m_max]),
                t2m_min: kelvin_to_celsius(i[cols.t2m_min]),
                d2m_mean: kelvin_to_celsius(i[cols.d2m_mean]),
                skt_mean: kelvin_to_celsius(i[cols.skt_mean]),
                sp_mean: i[cols.sp_mean],
                blh_mean: i[cols.blh_mean],
                tcc_mean: i[cols.tcc_mean],
                soil_moisture: i[cols.soil_moisture],
                tp_sum: metres_to_millimetres(a[cols.tp_sum]),
                e_sum: metres_to_millimetres(a[cols.e_sum]),
                ssrd_sum: a[cols.ssrd_sum],
                calendar,
                lai_total: total_leaf_area(i[cols.lai_hv], i[cols.lai_lv]),
                ws_mean: wind_speed(i[cols.u10], i[cols.v10]),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CleanTable { records })
}
