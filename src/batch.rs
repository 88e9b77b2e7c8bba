//! Batch driver: fan the year transformer out over the worker pool

use crate::config::EtlConfig;
use crate::errors::Result;
use crate::parallel::ParallelConfig;
use crate::pipeline::{process_one_year, YearOutcome};
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of a whole batch run
#[derive(Debug)]
pub struct BatchReport {
    /// One outcome per year, ascending by year
    pub outcomes: Vec<YearOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> Vec<i32> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.year)
            .collect()
    }

    pub fn failed(&self) -> Vec<i32> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.year)
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(YearOutcome::is_success)
    }

    pub fn outcome(&self, year: i32) -> Option<&YearOutcome> {
        self.outcomes.iter().find(|o| o.year == year)
    }

    pub fn print_summary(&self) {
        let failed = self.failed();
        println!("\n{}", "=".repeat(30));
        println!("TOTAL TIME: {:.2} minutes", self.elapsed.as_secs_f64() / 60.0);
        println!(
            "Years succeeded: {} / {}",
            self.outcomes.len() - failed.len(),
            self.outcomes.len()
        );
        if !failed.is_empty() {
            let years: Vec<String> = failed.iter().map(i32::to_string).collect();
            println!("Years failed: {}", years.join(", "));
        }
        println!("{}", "=".repeat(30));
    }
}

/// Process every configured year on a fixed-size worker pool.
///
/// Per-year failures are recorded in the report; only a failure to set up the
/// pool itself is returned as an error.
pub fn run_batch(config: &EtlConfig) -> Result<BatchReport> {
    config.validate()?;

    let started = Instant::now();
    let years = config.year_list();
    let pool = ParallelConfig::new(config.workers).build_pool()?;

    println!(
        "🚀 Processing {} years ({}..={}) in parallel on {} workers",
        years.len(),
        config.years.start(),
        config.years.end(),
        config.workers
    );
    info!(years = years.len(), workers = config.workers, "batch started");

    let mut outcomes: Vec<YearOutcome> = pool.install(|| {
        years
            .par_iter()
            .map(|&year| process_one_year(config, year))
            .collect()
    });
    outcomes.sort_by_key(|o| o.year);

    let report = BatchReport {
        outcomes,
        elapsed: started.elapsed(),
    };
    info!(
        succeeded = report.succeeded().len(),
        failed = report.failed().len(),
        elapsed_s = report.elapsed.as_secs_f64(),
        "batch finished"
    );

    Ok(report)
}
