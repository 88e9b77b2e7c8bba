//! Shared NetCDF fixture builders for the integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use netcdf::create;
use std::path::Path;

pub const INSTANT_FIELDS: [&str; 11] = [
    "t2m", "d2m", "skt", "sp", "blh", "tcc", "swvl1", "lai_hv", "lai_lv", "u10", "v10",
];
pub const ACCUM_FIELDS: [&str; 3] = ["tp", "e", "ssrd"];

pub const LATITUDES: [f64; 2] = [52.0, 51.75];
pub const LONGITUDES: [f64; 2] = [20.0, 20.25];

/// Hours since 1970-01-01 for midnight of `year-month-day`
pub fn epoch_hours(year: i32, month: u32, day: u32) -> f64 {
    let seconds = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp();
    (seconds / 3_600) as f64
}

type ValueFn = Box<dyn Fn(usize, usize, usize, usize) -> f64>;

struct FieldSpec {
    name: String,
    step_type: Option<String>,
    time_dim: String,
    stepped: bool,
    extra_singleton: Option<String>,
    attributes: Vec<(String, f64)>,
    value: ValueFn,
}

/// Builds a small ERA5-like NetCDF source.
///
/// Time axes are stored as hours since 1970-01-01; steps in hours.
pub struct SourceBuilder {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    time_axes: Vec<(String, Vec<f64>)>,
    steps: Option<Vec<f64>>,
    fields: Vec<FieldSpec>,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self {
            latitude: LATITUDES.to_vec(),
            longitude: LONGITUDES.to_vec(),
            time_axes: Vec::new(),
            steps: None,
            fields: Vec::new(),
        }
    }

    pub fn grid(mut self, latitude: &[f64], longitude: &[f64]) -> Self {
        self.latitude = latitude.to_vec();
        self.longitude = longitude.to_vec();
        self
    }

    /// Add a time coordinate named `name` (`time` or `valid_time`)
    pub fn time_axis(mut self, name: &str, hours: Vec<f64>) -> Self {
        self.time_axes.push((name.to_string(), hours));
        self
    }

    pub fn steps(mut self, hours: Vec<f64>) -> Self {
        self.steps = Some(hours);
        self
    }

    /// Add a field over (`time_dim`, [step,] latitude, longitude).
    /// `value` receives (time, step, lat, lon) indices.
    pub fn field(
        mut self,
        name: &str,
        step_type: Option<&str>,
        time_dim: &str,
        stepped: bool,
        value: impl Fn(usize, usize, usize, usize) -> f64 + 'static,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            step_type: step_type.map(str::to_string),
            time_dim: time_dim.to_string(),
            stepped,
            extra_singleton: None,
            attributes: Vec::new(),
            value: Box::new(value),
        });
        self
    }

    /// Give the most recently added field an extra length-1 leading axis
    pub fn with_singleton_axis(mut self, dim: &str) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.extra_singleton = Some(dim.to_string());
        }
        self
    }

    /// Attach a numeric attribute to the most recently added field
    pub fn with_attribute(mut self, name: &str, value: f64) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.attributes.push((name.to_string(), value));
        }
        self
    }

    fn time_len(&self, name: &str) -> usize {
        self.time_axes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.len())
            .unwrap_or(1)
    }

    pub fn write(&self, path: &Path) -> netcdf::Result<()> {
        let mut file = create(path)?;

        file.add_dimension("latitude", self.latitude.len())?;
        file.add_dimension("longitude", self.longitude.len())?;
        for (name, values) in &self.time_axes {
            file.add_dimension(name, values.len())?;
        }
        if let Some(steps) = &self.steps {
            file.add_dimension("step", steps.len())?;
        }
        let mut singletons: Vec<&str> = Vec::new();
        for field in &self.fields {
            if let Some(dim) = &field.extra_singleton {
                if !singletons.contains(&dim.as_str()) {
                    file.add_dimension(dim, 1)?;
                    singletons.push(dim);
                }
            }
        }

        {
            let mut var = file.add_variable::<f64>("latitude", &["latitude"])?;
            var.put_attribute("units", "degrees_north")?;
            var.put_values(&self.latitude, ..)?;
        }
        {
            let mut var = file.add_variable::<f64>("longitude", &["longitude"])?;
            var.put_attribute("units", "degrees_east")?;
            var.put_values(&self.longitude, ..)?;
        }
        for (name, values) in &self.time_axes {
            let mut var = file.add_variable::<f64>(name, &[name.as_str()])?;
            var.put_attribute("units", "hours since 1970-01-01 00:00:00")?;
            var.put_attribute("calendar", "proleptic_gregorian")?;
            var.put_values(values, ..)?;
        }
        if let Some(steps) = &self.steps {
            let mut var = file.add_variable::<f64>("step", &["step"])?;
            var.put_attribute("units", "hours")?;
            var.put_values(steps, ..)?;
        }

        let n_lat = self.latitude.len();
        let n_lon = self.longitude.len();
        let n_step = self.steps.as_ref().map(Vec::len).unwrap_or(1);

        for field in &self.fields {
            let n_time = self.time_len(&field.time_dim);
            let field_steps = if field.stepped { n_step } else { 1 };

            let mut dims: Vec<&str> = Vec::new();
            if let Some(dim) = &field.extra_singleton {
                dims.push(dim);
            }
            dims.push(&field.time_dim);
            if field.stepped {
                dims.push("step");
            }
            dims.push("latitude");
            dims.push("longitude");

            let mut values = Vec::with_capacity(n_time * field_steps * n_lat * n_lon);
            for t in 0..n_time {
                for s in 0..field_steps {
                    for i in 0..n_lat {
                        for j in 0..n_lon {
                            values.push((field.value)(t, s, i, j));
                        }
                    }
                }
            }

            let mut var = file.add_variable::<f64>(&field.name, &dims)?;
            for (name, value) in &field.attributes {
                var.put_attribute(name, *value)?;
            }
            if let Some(step_type) = &field.step_type {
                var.put_attribute("GRIB_stepType", step_type.as_str())?;
            }
            var.put_values(&values, ..)?;
        }

        Ok(())
    }
}

impl Default for SourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of an instant field at hour-of-day `hour` (index into the hourly axis)
pub fn instant_value(name: &str, hour: usize) -> f64 {
    match name {
        "t2m" => 273.15 + hour as f64,
        "d2m" => 270.15,
        "skt" => 280.15,
        "sp" => 101_325.0,
        "blh" => 500.0,
        "tcc" => 0.5,
        "swvl1" => 0.3,
        "lai_hv" => 0.6,
        "lai_lv" => 0.4,
        "u10" => 3.0,
        "v10" => 4.0,
        _ => 0.0,
    }
}

/// Hourly value of an accumulated field
pub fn accum_value(name: &str) -> f64 {
    match name {
        "tp" => 0.001,
        "e" => -0.0001,
        "ssrd" => 1_000.0,
        _ => 0.0,
    }
}

/// Instant fields hourly over 00..=23 of Jan 1 on `time`; accumulated fields
/// hourly over 01..=24 on `valid_time`, so the accumulated side also covers
/// the first bucket of Jan 2.
pub fn standard_builder(year: i32, instant: bool, accumulated: bool) -> SourceBuilder {
    let start = epoch_hours(year, 1, 1);
    let mut builder = SourceBuilder::new();

    if instant {
        builder = builder.time_axis("time", (0..24).map(|h| start + h as f64).collect());
        for name in INSTANT_FIELDS {
            builder = builder.field(name, Some("instant"), "time", false, move |t, _, _, _| {
                instant_value(name, t)
            });
        }
    }
    if accumulated {
        builder = builder.time_axis("valid_time", (1..=24).map(|h| start + h as f64).collect());
        for name in ACCUM_FIELDS {
            builder = builder.field(name, Some("accum"), "valid_time", false, move |_, _, _, _| {
                accum_value(name)
            });
        }
    }
    builder
}

/// Write the standard combined source `<raw_prefix><year>.nc`
pub fn write_standard_year(raw_prefix: &str, year: i32) {
    let path = format!("{raw_prefix}{year}.nc");
    standard_builder(year, true, true)
        .write(Path::new(&path))
        .expect("Failed to write fixture");
}

/// Write split sources `<raw_prefix><year>_instant.nc` and, if requested,
/// `<raw_prefix><year>_accum.nc`
pub fn write_split_year(raw_prefix: &str, year: i32, with_accum: bool) {
    let instant = format!("{raw_prefix}{year}_instant.nc");
    standard_builder(year, true, false)
        .write(Path::new(&instant))
        .expect("Failed to write instant fixture");

    if with_accum {
        let accum = format!("{raw_prefix}{year}_accum.nc");
        standard_builder(year, false, true)
            .write(Path::new(&accum))
            .expect("Failed to write accum fixture");
    }
}
