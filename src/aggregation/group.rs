//! Group-by-aggregate over (latitude, longitude, 12-hour bucket)

use super::bucket::bucket_start;
use super::operations::Accumulator;
use super::rules::AggRule;
use crate::errors::Result;
use crate::frame::{GridFrame, StepType};
use std::collections::BTreeMap;
use tracing::debug;

/// Grouping key. Coordinates are stored as hundredths so keys compare exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub lat_e2: i64,
    pub lon_e2: i64,
    /// Bucket start in seconds since the Unix epoch
    pub bucket: i64,
}

impl BucketKey {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, valid_time: i64) -> Self {
        Self {
            lat_e2: (latitude * 100.0).round() as i64,
            lon_e2: (longitude * 100.0).round() as i64,
            bucket: bucket_start(valid_time),
        }
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.lat_e2 as f64 / 100.0
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.lon_e2 as f64 / 100.0
    }
}

/// Result of aggregating one step type: one row of `columns` per key, sorted by key
#[derive(Debug, Clone)]
pub struct AggregatedFrame {
    pub step_type: StepType,
    pub columns: Vec<&'static str>,
    pub rows: BTreeMap<BucketKey, Vec<f64>>,
}

impl AggregatedFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    /// Value of `column` for `key`
    pub fn get(&self, key: &BucketKey, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(key).map(|row| row[idx])
    }
}

/// Group `frame` by (latitude, longitude, 12h bucket) and apply `rules`.
///
/// Fails with a schema error if a rule's source field is missing.
pub fn aggregate(frame: &GridFrame, rules: &[AggRule]) -> Result<AggregatedFrame> {
    frame.check_lengths()?;

    // Each source field is accumulated once even if several rules read it
    let mut sources: Vec<&'static str> = Vec::new();
    for rule in rules {
        if !sources.contains(&rule.source) {
            sources.push(rule.source);
        }
    }
    let columns: Vec<&[f64]> = sources
        .iter()
        .map(|name| frame.field(name))
        .collect::<Result<_>>()?;
    let rule_sources: Vec<usize> = rules
        .iter()
        .map(|rule| sources.iter().position(|s| *s == rule.source).unwrap_or_default())
        .collect();

    let mut groups: BTreeMap<BucketKey, Vec<Accumulator>> = BTreeMap::new();
    for row in 0..frame.len() {
        let key = BucketKey::new(frame.latitude[row], frame.longitude[row], frame.valid_time[row]);
        let accumulators = groups
            .entry(key)
            .or_insert_with(|| vec![Accumulator::new(); sources.len()]);
        for (acc, column) in accumulators.iter_mut().zip(&columns) {
            acc.push(column[row]);
        }
    }

    let rows: BTreeMap<BucketKey, Vec<f64>> = groups
        .into_iter()
        .map(|(key, accumulators)| {
            let values = rules
                .iter()
                .zip(&rule_sources)
                .map(|(rule, &src)| accumulators[src].finish(rule.func))
                .collect();
            (key, values)
        })
        .collect();

    debug!(
        step_type = %frame.step_type,
        input_rows = frame.len(),
        groups = rows.len(),
        "aggregated to 12h buckets"
    );

    Ok(AggregatedFrame {
        step_type: frame.step_type,
        columns: rules.iter().map(|r| r.output).collect(),
        rows,
    })
}
