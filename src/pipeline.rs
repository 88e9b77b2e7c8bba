//! Year transformer: the full ETL for one year
//!
//! [`process_one_year`] is the failure boundary of the batch. Whatever goes
//! wrong while reading, aggregating, deriving or writing a year is logged with
//! the year and turned into a [`YearStatus::Failed`]; it never reaches the
//! batch driver as an error.

use crate::aggregation::{aggregate, rules_for};
use crate::config::EtlConfig;
use crate::errors::{EtlError, Result};
use crate::frame::StepType;
use crate::grid_reader::get_clean_frame;
use crate::parquet_io::write_clean_table;
use crate::transform::{self, CleanTable};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// What happened to one year
#[derive(Debug)]
pub enum YearStatus {
    Written { path: PathBuf, rows: usize, bytes: u64 },
    Failed { error: EtlError },
}

/// Per-year result reported back to the batch driver
#[derive(Debug)]
pub struct YearOutcome {
    pub year: i32,
    pub elapsed: Duration,
    pub status: YearStatus,
}

impl YearOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, YearStatus::Written { .. })
    }

    pub fn error(&self) -> Option<&EtlError> {
        match &self.status {
            YearStatus::Failed { error } => Some(error),
            YearStatus::Written { .. } => None,
        }
    }
}

/// Read, aggregate and derive one year without writing anything
pub fn build_clean_table(config: &EtlConfig, year: i32) -> Result<CleanTable> {
    let instant = {
        let frame = get_clean_frame(config, year, StepType::Instant)?;
        aggregate(&frame, rules_for(StepType::Instant))?
    };
    let accumulated = {
        let frame = get_clean_frame(config, year, StepType::Accumulated)?;
        aggregate(&frame, rules_for(StepType::Accumulated))?
    };

    transform::build_clean_table(&instant, &accumulated)
}

fn run_year(config: &EtlConfig, year: i32) -> Result<YearStatus> {
    let table = build_clean_table(config, year)?;
    if table.is_empty() {
        warn!(year, "no bucket present in both step types, writing an empty table");
    }

    let path = config.output_path(year);
    let bytes = write_clean_table(&table, &path)?;

    Ok(YearStatus::Written {
        path,
        rows: table.len(),
        bytes,
    })
}

/// Run the whole ETL for `year`, catching every failure
pub fn process_one_year(config: &EtlConfig, year: i32) -> YearOutcome {
    let started = Instant::now();
    let status = match run_year(config, year) {
        Ok(status) => status,
        Err(error) => YearStatus::Failed { error },
    };
    let elapsed = started.elapsed();

    match &status {
        YearStatus::Written { path, rows, bytes } => {
            info!(year, rows, bytes, path = %path.display(), "year written");
            println!(
                "✅ File processed: {} in {:.2}s ({} rows)",
                year,
                elapsed.as_secs_f64(),
                rows
            );
        }
        YearStatus::Failed { error } => {
            error!(year, kind = error.kind(), error = %error, "year failed");
            println!("❌ Error in year {}: {}", year, error);
        }
    }

    YearOutcome {
        year,
        elapsed,
        status,
    }
}
