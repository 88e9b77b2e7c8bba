//! Cleaned tabular form of one decoded grid source

use crate::errors::{EtlError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// GRIB step type a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepType {
    /// Point-in-time snapshot fields
    Instant,
    /// Fields accumulated since the previous step
    Accumulated,
}

impl StepType {
    /// Value of the `GRIB_stepType` attribute for this step type
    #[must_use]
    pub const fn grib_tag(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Accumulated => "accum",
        }
    }

    pub fn from_grib_tag(tag: &str) -> Option<Self> {
        match tag {
            "instant" => Some(Self::Instant),
            "accum" => Some(Self::Accumulated),
            _ => None,
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.grib_tag())
    }
}

/// Row-per-observation table produced by the grid reader.
///
/// Columns are stored side by side; every vector has the same length.
/// `valid_time` is whole seconds since the Unix epoch (UTC).
#[derive(Debug, Clone)]
pub struct GridFrame {
    pub step_type: StepType,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub valid_time: Vec<i64>,
    pub fields: BTreeMap<String, Vec<f64>>,
}

impl GridFrame {
    pub fn new(step_type: StepType) -> Self {
        Self {
            step_type,
            latitude: Vec::new(),
            longitude: Vec::new(),
            valid_time: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.valid_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_time.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Column of a physical field, or a schema error naming what is there
    pub fn field(&self, name: &str) -> Result<&[f64]> {
        self.fields.get(name).map(Vec::as_slice).ok_or_else(|| {
            EtlError::schema(format!(
                "field '{}' missing from {} frame (available: {})",
                name,
                self.step_type,
                self.field_names().join(", ")
            ))
        })
    }

    /// Check that every column has as many rows as `valid_time`
    pub fn check_lengths(&self) -> Result<()> {
        let rows = self.len();
        if self.latitude.len() != rows || self.longitude.len() != rows {
            return Err(EtlError::schema(format!(
                "coordinate columns have {}/{} rows, expected {}",
                self.latitude.len(),
                self.longitude.len(),
                rows
            )));
        }
        for (name, values) in &self.fields {
            if values.len() != rows {
                return Err(EtlError::schema(format!(
                    "field '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    rows
                )));
            }
        }
        Ok(())
    }
}

/// Round a coordinate to 2 decimal places, ties to even
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
