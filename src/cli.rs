//! Defines command-line interface options using `clap` for the ETL binary.

use crate::config::{
    default_worker_count, EtlConfig, SourceLayout, DEFAULT_CLEAN_PREFIX, DEFAULT_FIRST_YEAR,
    DEFAULT_LAST_YEAR, DEFAULT_RAW_PREFIX,
};
use clap::Parser;

/// Yearly ERA5 grid → 12-hourly Parquet ETL
#[derive(Parser, Debug)]
#[command(
    version,
    name = "era5-etl",
    about = "Aggregate yearly ERA5 grids to 12-hour buckets and write one Parquet file per year"
)]
pub struct Args {
    /// Prefix of raw source files; the year and `.nc` are appended
    #[arg(long, default_value = DEFAULT_RAW_PREFIX)]
    pub raw_prefix: String,

    /// Prefix of clean output files; the year and `.parquet` are appended
    #[arg(long, default_value = DEFAULT_CLEAN_PREFIX)]
    pub clean_prefix: String,

    /// First year to process
    #[arg(long, default_value_t = DEFAULT_FIRST_YEAR)]
    pub start_year: i32,

    /// Last year to process (inclusive)
    #[arg(long, default_value_t = DEFAULT_LAST_YEAR)]
    pub end_year: i32,

    /// Number of year workers. Defaults to half the CPU cores minus one.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Read `<prefix><year>_instant.nc` and `<prefix><year>_accum.nc` instead of one file per year
    #[arg(long, default_value_t = false)]
    pub split_by_step_type: bool,

    /// Print the fields of one year's raw source per step type and exit
    #[arg(long, value_name = "YEAR")]
    pub inspect: Option<i32>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Pipeline configuration described by these arguments
    pub fn to_config(&self) -> EtlConfig {
        let layout = if self.split_by_step_type {
            SourceLayout::Split
        } else {
            SourceLayout::Combined
        };
        EtlConfig::new(self.raw_prefix.clone(), self.clean_prefix.clone())
            .with_years(self.start_year..=self.end_year)
            .with_workers(
                self.workers
                    .unwrap_or_else(|| default_worker_count(num_cpus::get())),
            )
            .with_layout(layout)
    }
}
