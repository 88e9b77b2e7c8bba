//! Parquet output of clean tables
//!
//! Tables are converted to a polars [`DataFrame`] with narrowed integer
//! columns and written with Snappy compression. The file is first written
//! next to its destination and renamed into place only once complete, so a
//! failed write never leaves a partial or empty output behind.

use crate::errors::{EtlError, Result};
use crate::features::days_since_epoch;
use crate::transform::{CleanRecord, CleanTable};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer for one year's clean table
pub struct CleanTableWriter<'a> {
    output_path: &'a Path,
}

impl<'a> CleanTableWriter<'a> {
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Temporary sibling the table is written to before the final rename
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self
            .output_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        self.output_path.with_file_name(name)
    }

    /// Write `table`, returning the number of bytes written
    pub fn write(&self, table: &CleanTable) -> Result<u64> {
        let mut df = to_dataframe(table)
            .map_err(|e| EtlError::write(self.output_path, format!("building frame: {}", e)))?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    EtlError::write(self.output_path, format!("creating '{}': {}", parent.display(), e))
                })?;
            }
        }

        let staging = self.staging_path();
        match self.write_staged(&mut df, &staging) {
            Ok(bytes) => {
                if let Err(e) = fs::rename(&staging, self.output_path) {
                    let _ = fs::remove_file(&staging);
                    return Err(EtlError::write(self.output_path, e.to_string()));
                }
                debug!(path = %self.output_path.display(), rows = df.height(), bytes, "parquet written");
                Ok(bytes)
            }
            Err(e) => {
                let _ = fs::remove_file(&staging);
                Err(e)
            }
        }
    }

    fn write_staged(&self, df: &mut DataFrame, staging: &Path) -> Result<u64> {
        let mut file = fs::File::create(staging)
            .map_err(|e| EtlError::write(staging, e.to_string()))?;
        let bytes = ParquetWriter::new(&mut file)
            .with_compression(ParquetCompression::Snappy)
            .finish(df)
            .map_err(|e| EtlError::write(staging, e.to_string()))?;
        file.sync_all()
            .map_err(|e| EtlError::write(staging, e.to_string()))?;
        Ok(bytes)
    }
}

/// Write `table` to `output_path`
pub fn write_clean_table(table: &CleanTable, output_path: &Path) -> Result<u64> {
    CleanTableWriter::new(output_path).write(table)
}

fn float_column(name: &str, records: &[CleanRecord], value: impl Fn(&CleanRecord) -> f64) -> Column {
    Column::new(name.into(), records.iter().map(value).collect::<Vec<f64>>())
}

fn i8_column(name: &str, records: &[CleanRecord], value: impl Fn(&CleanRecord) -> i8) -> Column {
    Column::new(name.into(), records.iter().map(value).collect::<Vec<i8>>())
}

fn i16_column(name: &str, records: &[CleanRecord], value: impl Fn(&CleanRecord) -> i16) -> Column {
    Column::new(name.into(), records.iter().map(value).collect::<Vec<i16>>())
}

/// Columnar form of a clean table, in output column order
pub fn to_dataframe(table: &CleanTable) -> PolarsResult<DataFrame> {
    let r = table.records.as_slice();

    let date_days: Vec<i32> = r.iter().map(|rec| days_since_epoch(rec.calendar.date)).collect();
    let date = Series::new("date".into(), date_days).cast(&DataType::Date)?;

    DataFrame::new(vec![
        float_column("latitude", r, |rec| rec.latitude),
        float_column("longitude", r, |rec| rec.longitude),
        float_column("t2m_mean", r, |rec| rec.t2m_mean),
        float_column("t2m_max", r, |rec| rec.t2m_max),
        float_column("t2m_min", r, |rec| rec.t2m_min),
        float_column("d2m_mean", r, |rec| rec.d2m_mean),
        float_column("skt_mean", r, |rec| rec.skt_mean),
        float_column("sp_mean", r, |rec| rec.sp_mean),
        float_column("blh_mean", r, |rec| rec.blh_mean),
        float_column("tcc_mean", r, |rec| rec.tcc_mean),
        float_column("soil_moisture", r, |rec| rec.soil_moisture),
        float_column("tp_sum", r, |rec| rec.tp_sum),
        float_column("e_sum", r, |rec| rec.e_sum),
        float_column("ssrd_sum", r, |rec| rec.ssrd_sum),
        date.into_column(),
        i8_column("hour", r, |rec| rec.calendar.hour),
        i16_column("year", r, |rec| rec.calendar.year),
        i8_column("month", r, |rec| rec.calendar.month),
        i8_column("day", r, |rec| rec.calendar.day),
        i16_column("dayofyear", r, |rec| rec.calendar.dayofyear),
        i8_column("season", r, |rec| rec.calendar.season),
        float_column("lai_total", r, |rec| rec.lai_total),
        float_column("ws_mean", r, |rec| rec.ws_mean),
    ])
}
