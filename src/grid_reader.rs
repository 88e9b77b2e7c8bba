//! Grid reader: decode one raw NetCDF source into a [`GridFrame`]
//!
//! A field variable is any variable laid out over `latitude`, `longitude` and
//! a time axis (`time` or `valid_time`), optionally with a forecast `step`
//! axis. Extra axes are tolerated only with length 1 (ensemble `number`,
//! `surface`, soil `depthBelowLandLayer`). The grid is flattened to one row
//! per (time, step, latitude, longitude) with
//! `valid_time = time + step` and coordinates rounded to 2 decimals.

use crate::cf_time::{parse_step_units, parse_time_units};
use crate::config::{EtlConfig, SourceLayout};
use crate::errors::{EtlError, Result};
use crate::frame::{round_coordinate, GridFrame, StepType};
use ndarray::{ArrayD, Axis, IxDyn};
use netcdf::{AttributeValue, File, Variable};
use std::path::Path;
use tracing::{debug, info};

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const TIME: &str = "time";
pub const VALID_TIME: &str = "valid_time";
pub const STEP: &str = "step";

/// Bookkeeping variables that never become frame columns
const BOOKKEEPING: [&str; 8] = [
    LATITUDE,
    LONGITUDE,
    TIME,
    VALID_TIME,
    STEP,
    "number",
    "surface",
    "depthBelowLandLayer",
];

const STEP_TYPE_ATTRIBUTE: &str = "GRIB_stepType";

/// Load the cleaned frame of `step_type` fields for `year`
pub fn get_clean_frame(config: &EtlConfig, year: i32, step_type: StepType) -> Result<GridFrame> {
    let path = config.input_path(year, step_type);
    info!(year, %step_type, path = %path.display(), "reading grid source");
    read_grid_file(&path, step_type, config.layout)
}

/// Decode `path`, keeping only fields that belong to `step_type`
pub fn read_grid_file(path: &Path, step_type: StepType, layout: SourceLayout) -> Result<GridFrame> {
    if !path.exists() {
        return Err(EtlError::decode(path, "source file not found"));
    }

    let file = netcdf::open(path).map_err(|e| EtlError::decode(path, e.to_string()))?;

    let latitude = read_coordinate(&file, path, LATITUDE)?;
    let longitude = read_coordinate(&file, path, LONGITUDE)?;

    let fields: Vec<Variable> = file
        .variables()
        .filter(|var| is_field_of(var, step_type, layout))
        .collect();

    if fields.is_empty() {
        return Err(EtlError::schema(format!(
            "no '{}' fields found in '{}'",
            step_type,
            path.display()
        )));
    }

    let axes = FieldAxes::resolve(&fields[0], path)?;
    let base_times = read_base_times(&file, path, &axes)?;
    let steps = read_steps(&file, path, &axes)?;

    if axes.lat_len != latitude.len() || axes.lon_len != longitude.len() {
        return Err(EtlError::decode(
            path,
            format!(
                "field grid {}x{} does not match coordinates {}x{}",
                axes.lat_len,
                axes.lon_len,
                latitude.len(),
                longitude.len()
            ),
        ));
    }

    let mut frame = GridFrame::new(step_type);
    let rows = base_times.len() * steps.len() * latitude.len() * longitude.len();
    frame.latitude.reserve(rows);
    frame.longitude.reserve(rows);
    frame.valid_time.reserve(rows);

    // Row order matches the canonical (time, step, latitude, longitude) layout
    for &base in &base_times {
        for &step in &steps {
            for &lat in &latitude {
                for &lon in &longitude {
                    frame.valid_time.push(base + step);
                    frame.latitude.push(round_coordinate(lat));
                    frame.longitude.push(round_coordinate(lon));
                }
            }
        }
    }

    for var in &fields {
        let name = var.name();
        let field_axes = FieldAxes::resolve(var, path)?;
        if !field_axes.same_grid(&axes) {
            return Err(EtlError::decode(
                path,
                format!("field '{}' does not share the grid layout of '{}'", name, fields[0].name()),
            ));
        }
        let values = read_field_values(var, path, &field_axes)?;
        debug!(field = %name, rows = values.len(), "decoded field");
        frame.fields.insert(name, values);
    }

    frame.check_lengths()?;

    debug!(
        path = %path.display(),
        %step_type,
        rows = frame.len(),
        fields = %frame.field_names().join(","),
        "grid source flattened"
    );

    Ok(frame)
}

/// Whether `var` is a physical field of `step_type` under `layout`
fn is_field_of(var: &Variable, step_type: StepType, layout: SourceLayout) -> bool {
    let name = var.name();
    if BOOKKEEPING.contains(&name.as_str()) {
        return false;
    }

    let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    if !dims.iter().any(|d| d == LATITUDE) || !dims.iter().any(|d| d == LONGITUDE) {
        return false;
    }

    match string_attribute(var, STEP_TYPE_ATTRIBUTE) {
        Some(tag) => StepType::from_grib_tag(&tag) == Some(step_type),
        // Split files hold a single step type, so untagged fields belong to it
        None => layout == SourceLayout::Split,
    }
}

/// Positions of the recognised axes within a field variable
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldAxes {
    dim_names: Vec<String>,
    time_dim: Option<String>,
    time_len: usize,
    step_len: Option<usize>,
    lat_len: usize,
    lon_len: usize,
}

impl FieldAxes {
    fn resolve(var: &Variable, path: &Path) -> Result<Self> {
        let mut axes = FieldAxes {
            dim_names: Vec::new(),
            time_dim: None,
            time_len: 1,
            step_len: None,
            lat_len: 0,
            lon_len: 0,
        };

        for dim in var.dimensions() {
            let name = dim.name();
            match name.as_str() {
                LATITUDE => axes.lat_len = dim.len(),
                LONGITUDE => axes.lon_len = dim.len(),
                TIME | VALID_TIME => {
                    if axes.time_dim.is_some() {
                        return Err(EtlError::decode(
                            path,
                            format!("field '{}' has two time axes", var.name()),
                        ));
                    }
                    axes.time_dim = Some(name.clone());
                    axes.time_len = dim.len();
                }
                STEP => axes.step_len = Some(dim.len()),
                _ if dim.len() == 1 => {}
                _ => {
                    return Err(EtlError::decode(
                        path,
                        format!(
                            "field '{}' has unsupported axis '{}' of length {}",
                            var.name(),
                            name,
                            dim.len()
                        ),
                    ))
                }
            }
            axes.dim_names.push(name);
        }

        Ok(axes)
    }

    /// Same time, step and spatial extents; singleton extras may differ
    fn same_grid(&self, other: &FieldAxes) -> bool {
        self.time_dim == other.time_dim
            && self.time_len == other.time_len
            && self.step_len == other.step_len
            && self.lat_len == other.lat_len
            && self.lon_len == other.lon_len
    }
}

/// Read a 1-D coordinate variable as f64
fn read_coordinate(file: &File, path: &Path, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| EtlError::schema(format!("coordinate '{}' missing from '{}'", name, path.display())))?;
    var.get_values::<f64, _>(..)
        .map_err(|e| EtlError::decode(path, format!("cannot read '{}': {}", name, e)))
}

/// Base times of the field time axis (or the scalar `time`) in epoch seconds
fn read_base_times(file: &File, path: &Path, axes: &FieldAxes) -> Result<Vec<i64>> {
    let name = axes.time_dim.as_deref().unwrap_or(TIME);
    let var = file.variable(name).ok_or_else(|| {
        EtlError::schema(format!("time coordinate '{}' missing from '{}'", name, path.display()))
    })?;

    let units = string_attribute(&var, "units")
        .ok_or_else(|| EtlError::decode(path, format!("'{}' has no units attribute", name)))?;
    let time_units = parse_time_units(&units)
        .ok_or_else(|| EtlError::decode(path, format!("unrecognised time units '{}'", units)))?;

    let raw = var
        .get_values::<f64, _>(..)
        .map_err(|e| EtlError::decode(path, format!("cannot read '{}': {}", name, e)))?;

    if raw.len() != axes.time_len {
        return Err(EtlError::decode(
            path,
            format!("'{}' has {} values, expected {}", name, raw.len(), axes.time_len),
        ));
    }

    Ok(raw.into_iter().map(|v| time_units.to_epoch_seconds(v)).collect())
}

/// Forecast step offsets in seconds; a single zero offset when there is no step
fn read_steps(file: &File, path: &Path, axes: &FieldAxes) -> Result<Vec<i64>> {
    let Some(var) = file.variable(STEP) else {
        return match axes.step_len {
            Some(_) => Err(EtlError::schema(format!(
                "step axis present but 'step' coordinate missing from '{}'",
                path.display()
            ))),
            None => Ok(vec![0]),
        };
    };

    // GRIB steps default to hours when the unit is not recorded
    let seconds_per_unit = match string_attribute(&var, "units") {
        Some(units) => parse_step_units(&units)
            .ok_or_else(|| EtlError::decode(path, format!("unrecognised step units '{}'", units)))?,
        None => 3_600.0,
    };

    let raw = var
        .get_values::<f64, _>(..)
        .map_err(|e| EtlError::decode(path, format!("cannot read 'step': {}", e)))?;
    let offsets: Vec<i64> = raw
        .into_iter()
        .map(|v| (v * seconds_per_unit).round() as i64)
        .collect();

    match axes.step_len {
        Some(len) if offsets.len() == len => Ok(offsets),
        Some(len) => Err(EtlError::decode(
            path,
            format!("'step' has {} values, expected {}", offsets.len(), len),
        )),
        // Only a scalar step applies to fields without a step axis
        None if var.dimensions().is_empty() => Ok(vec![offsets.first().copied().unwrap_or(0)]),
        None => Ok(vec![0]),
    }
}

/// Field values in canonical (time, step, latitude, longitude) order,
/// masked and unpacked
fn read_field_values(var: &Variable, path: &Path, axes: &FieldAxes) -> Result<Vec<f64>> {
    let name = var.name();
    let raw = var
        .get_values::<f64, _>(..)
        .map_err(|e| EtlError::decode(path, format!("cannot read '{}': {}", name, e)))?;

    let fill_value = numeric_attribute(var, "_FillValue");
    let missing_value = numeric_attribute(var, "missing_value");
    let scale = numeric_attribute(var, "scale_factor").unwrap_or(1.0);
    let offset = numeric_attribute(var, "add_offset").unwrap_or(0.0);

    let values: Vec<f64> = raw
        .into_iter()
        .map(|v| {
            if Some(v) == fill_value || Some(v) == missing_value || !v.is_finite() {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect();

    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mut array = ArrayD::from_shape_vec(shape, values)?;
    let mut names = axes.dim_names.clone();

    // Drop length-1 extra axes, highest index first so positions stay valid
    for idx in (0..names.len()).rev() {
        if !is_known_axis(&names[idx]) {
            array = array.index_axis_move(Axis(idx), 0);
            names.remove(idx);
        }
    }

    // Insert missing time/step axes so every field is 4-D
    if axes.time_dim.is_none() {
        array = array.insert_axis(Axis(0));
        names.insert(0, TIME.to_string());
    }
    if axes.step_len.is_none() {
        array = array.insert_axis(Axis(0));
        names.insert(0, STEP.to_string());
    }

    let time_name = axes.time_dim.clone().unwrap_or_else(|| TIME.to_string());
    let order = [time_name.as_str(), STEP, LATITUDE, LONGITUDE];
    let permutation: Vec<usize> = order
        .iter()
        .map(|axis| {
            names.iter().position(|n| n == axis).ok_or_else(|| {
                EtlError::decode(path, format!("field '{}' lacks axis '{}'", name, axis))
            })
        })
        .collect::<Result<_>>()?;

    let canonical = array.permuted_axes(IxDyn(&permutation));
    Ok(canonical.as_standard_layout().iter().copied().collect())
}

fn is_known_axis(name: &str) -> bool {
    matches!(name, LATITUDE | LONGITUDE | TIME | VALID_TIME | STEP)
}

/// First numeric value of an attribute, if any
pub(crate) fn numeric_attribute(var: &Variable, name: &str) -> Option<f64> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Shorts(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Ints(v) => v.first().map(|&x| f64::from(x)),
        _ => None,
    }
}

/// String value of an attribute, if any
pub(crate) fn string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(mut v) if !v.is_empty() => Some(v.swap_remove(0)),
        _ => None,
    }
}
