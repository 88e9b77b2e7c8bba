//! era5_etl: yearly ERA5 grid → 12-hourly Parquet ETL
//!
//! Reads one year of gridded reanalysis data per step type (instant and
//! accumulated), aggregates both to 12-hour buckets, inner-joins them on
//! (latitude, longitude, bucket), derives calendar, season and composite
//! features, converts units and writes one Parquet file per year. Years run
//! in parallel on a fixed-size worker pool and fail independently.
//!
//! ## Module Organization
//!
//! - [`grid_reader`]: NetCDF decoding into a cleaned [`frame::GridFrame`]
//! - [`aggregation`]: declarative rule tables and 12-hour group-by-aggregate
//! - [`transform`] and [`features`]: join, calendar fields, unit conversion
//! - [`parquet_io`]: atomic Parquet output
//! - [`pipeline`]: the per-year failure boundary
//! - [`batch`] and [`parallel`]: worker pool fan-out and the batch report
//! - [`config`], [`errors`], [`logging`], [`metadata`]: ambient concerns
//!
//! ## Usage
//! ```rust,no_run
//! use era5_etl::prelude::*;
//!
//! # fn main() -> era5_etl::Result<()> {
//! let config = EtlConfig::new("data/raw/era5_", "data/clean/era5_")
//!     .with_years(2000..=2001)
//!     .with_workers(2);
//! let report = run_batch(&config)?;
//! report.print_summary();
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod batch;
pub mod cf_time;
pub mod cli;
pub mod config;
pub mod errors;
pub mod features;
pub mod frame;
pub mod grid_reader;
pub mod logging;
pub mod metadata;
pub mod parallel;
pub mod parquet_io;
pub mod pipeline;
pub mod transform;

pub use batch::{run_batch, BatchReport};
pub use config::{EtlConfig, SourceLayout};
pub use errors::{EtlError, Result};
pub use frame::{GridFrame, StepType};
pub use grid_reader::get_clean_frame;
pub use pipeline::{build_clean_table, process_one_year, YearOutcome, YearStatus};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::aggregation::{aggregate, rules_for, AggFunc, AggRule, AggregatedFrame, BucketKey};
    pub use crate::batch::{run_batch, BatchReport};
    pub use crate::config::{EtlConfig, SourceLayout};
    pub use crate::errors::{EtlError, Result};
    pub use crate::frame::{GridFrame, StepType};
    pub use crate::grid_reader::get_clean_frame;
    pub use crate::parallel::ParallelConfig;
    pub use crate::pipeline::{build_clean_table, process_one_year, YearOutcome, YearStatus};
    pub use crate::transform::{CleanRecord, CleanTable};
}
