//! Explicit pipeline configuration
//!
//! The raw and clean path prefixes are passed through [`EtlConfig`] instead of
//! living in process-wide constants, so tests can point the whole pipeline at
//! a temporary directory.

use crate::errors::{EtlError, Result};
use crate::frame::StepType;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// First year processed by the default batch
pub const DEFAULT_FIRST_YEAR: i32 = 1994;
/// Last year (inclusive) processed by the default batch
pub const DEFAULT_LAST_YEAR: i32 = 2025;

pub const DEFAULT_RAW_PREFIX: &str = "data/raw/era5_";
pub const DEFAULT_CLEAN_PREFIX: &str = "data/clean/era5_";
pub const RAW_EXTENSION: &str = ".nc";
pub const CLEAN_EXTENSION: &str = ".parquet";

/// How the raw source files of one year are laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceLayout {
    /// One file per year, fields told apart by their `GRIB_stepType` attribute
    #[default]
    Combined,
    /// One file per year and step type, `<prefix><year>_<tag><ext>`
    Split,
}

/// Configuration shared read-only by every worker
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub raw_prefix: String,
    pub clean_prefix: String,
    pub raw_extension: String,
    pub clean_extension: String,
    pub layout: SourceLayout,
    pub years: RangeInclusive<i32>,
    pub workers: usize,
}

impl EtlConfig {
    /// Create a configuration for the given prefixes with default years and workers
    pub fn new(raw_prefix: impl Into<String>, clean_prefix: impl Into<String>) -> Self {
        Self {
            raw_prefix: raw_prefix.into(),
            clean_prefix: clean_prefix.into(),
            raw_extension: RAW_EXTENSION.to_string(),
            clean_extension: CLEAN_EXTENSION.to_string(),
            layout: SourceLayout::Combined,
            years: DEFAULT_FIRST_YEAR..=DEFAULT_LAST_YEAR,
            workers: default_worker_count(num_cpus::get()),
        }
    }

    #[must_use]
    pub fn with_years(mut self, years: RangeInclusive<i32>) -> Self {
        self.years = years;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Path of the raw source holding `step_type` fields for `year`
    pub fn input_path(&self, year: i32, step_type: StepType) -> PathBuf {
        match self.layout {
            SourceLayout::Combined => {
                PathBuf::from(format!("{}{year}{}", self.raw_prefix, self.raw_extension))
            }
            SourceLayout::Split => PathBuf::from(format!(
                "{}{year}_{}{}",
                self.raw_prefix,
                step_type.grib_tag(),
                self.raw_extension
            )),
        }
    }

    /// Path of the Parquet file written for `year`
    pub fn output_path(&self, year: i32) -> PathBuf {
        PathBuf::from(format!("{}{year}{}", self.clean_prefix, self.clean_extension))
    }

    /// Years in the configured range, ascending
    pub fn year_list(&self) -> Vec<i32> {
        self.years.clone().collect()
    }

    /// Reject configurations the batch driver cannot run
    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            return Err(EtlError::InvalidConfig {
                message: format!(
                    "empty year range {}..={}",
                    self.years.start(),
                    self.years.end()
                ),
            });
        }
        if self.workers == 0 {
            return Err(EtlError::InvalidConfig {
                message: "worker count must be at least 1".to_string(),
            });
        }
        if self.raw_prefix.is_empty() || self.clean_prefix.is_empty() {
            return Err(EtlError::InvalidConfig {
                message: "path prefixes must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RAW_PREFIX, DEFAULT_CLEAN_PREFIX)
    }
}

/// Roughly half the cores minus one, never below one worker
#[must_use]
pub fn default_worker_count(cpus: usize) -> usize {
    (cpus / 2).saturating_sub(1).max(1)
}
