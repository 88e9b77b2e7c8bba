//! Raw source inspection
//!
//! Lists the dimensions and physical fields of a raw NetCDF source together
//! with their GRIB step type, which is what decides whether a field is read
//! as instant or accumulated.

use crate::config::EtlConfig;
use crate::errors::{EtlError, Result};
use crate::frame::StepType;
use crate::grid_reader::string_attribute;
use std::path::{Path, PathBuf};

/// Information about a dimension
#[derive(Debug, Clone)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// A variable laid out over latitude/longitude
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub dimensions: Vec<String>,
    pub step_type: Option<StepType>,
    pub units: Option<String>,
    pub long_name: Option<String>,
}

/// Structured summary of one raw source file
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub dimensions: Vec<DimensionInfo>,
    pub fields: Vec<FieldInfo>,
}

impl SourceSummary {
    /// Fields tagged with `step_type`
    pub fn fields_of(&self, step_type: StepType) -> Vec<&FieldInfo> {
        self.fields
            .iter()
            .filter(|f| f.step_type == Some(step_type))
            .collect()
    }

    pub fn print(&self) {
        println!("\n Source: {}", self.path.display());
        println!("==============");

        if self.dimensions.is_empty() {
            println!("   (No dimensions found)");
        }
        for dim in &self.dimensions {
            let length_info = if dim.is_unlimited {
                format!("{} (unlimited)", dim.length)
            } else {
                dim.length.to_string()
            };
            println!("    {} = {}", dim.name, length_info);
        }

        println!("\n Fields");
        println!("=============");
        if self.fields.is_empty() {
            println!("   (No gridded fields found)");
        }
        for field in &self.fields {
            let step = field
                .step_type
                .map(|s| s.grib_tag().to_string())
                .unwrap_or_else(|| "untagged".to_string());
            println!("    {} [{}] ({})", field.name, step, field.dimensions.join(", "));

            let mut key_attrs = Vec::new();
            if let Some(units) = &field.units {
                key_attrs.push(format!("units: {}", units));
            }
            if let Some(long_name) = &field.long_name {
                key_attrs.push(format!("long_name: {}", long_name));
            }
            if !key_attrs.is_empty() {
                println!("      └─ {}", key_attrs.join(", "));
            }
        }
    }
}

/// Summarise the raw source at `path`
pub fn describe_source(path: &Path) -> Result<SourceSummary> {
    let file = netcdf::open(path).map_err(|e| EtlError::decode(path, e.to_string()))?;

    let mut dimensions: Vec<DimensionInfo> = file
        .dimensions()
        .map(|d| DimensionInfo {
            name: d.name(),
            length: d.len(),
            is_unlimited: d.is_unlimited(),
        })
        .collect();
    dimensions.sort_by(|a, b| a.name.cmp(&b.name));

    let mut fields: Vec<FieldInfo> = file
        .variables()
        .filter_map(|var| {
            let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
            let gridded = dims.iter().any(|d| d == "latitude") && dims.iter().any(|d| d == "longitude");
            if !gridded {
                return None;
            }
            Some(FieldInfo {
                name: var.name(),
                dimensions: dims,
                step_type: string_attribute(&var, "GRIB_stepType")
                    .as_deref()
                    .and_then(StepType::from_grib_tag),
                units: string_attribute(&var, "units"),
                long_name: string_attribute(&var, "long_name"),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(SourceSummary {
        path: path.to_path_buf(),
        dimensions,
        fields,
    })
}

/// Summaries of every distinct source file read for `year`
pub fn describe_year(config: &EtlConfig, year: i32) -> Result<Vec<SourceSummary>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for step_type in [StepType::Instant, StepType::Accumulated] {
        let path = config.input_path(year, step_type);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths.iter().map(|p| describe_source(p)).collect()
}
