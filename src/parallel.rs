//! Worker pool configuration
//!
//! Years are processed on a dedicated Rayon pool, not the global one. Its size
//! is fixed when the batch starts.

use crate::config::default_worker_count;
use crate::errors::{EtlError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Configuration for the year worker pool
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    pub num_workers: usize,
}

impl ParallelConfig {
    pub fn new(num_workers: usize) -> Self {
        Self { num_workers }
    }

    /// Half the available cores minus one, at least one
    pub fn from_available_cores() -> Self {
        Self {
            num_workers: default_worker_count(num_cpus::get()),
        }
    }

    /// Build the fixed-size pool years are dispatched to
    pub fn build_pool(&self) -> Result<ThreadPool> {
        if self.num_workers == 0 {
            return Err(EtlError::ThreadPoolError(
                "worker pool needs at least one thread".to_string(),
            ));
        }

        ThreadPoolBuilder::new()
            .num_threads(self.num_workers)
            .thread_name(|idx| format!("era5-worker-{idx}"))
            .build()
            .map_err(|e| {
                EtlError::ThreadPoolError(format!(
                    "Failed to initialize pool with {} workers: {}",
                    self.num_workers, e
                ))
            })
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self::from_available_cores()
    }
}

/// Get information about the parallel processing environment
pub fn get_parallel_info(num_workers: usize) -> ParallelInfo {
    ParallelInfo {
        workers: num_workers,
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub workers: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    pub fn print_info(&self) {
        println!("📊 Parallel Processing Information:");
        println!("   Year workers: {}", self.workers);
        println!("   Available CPU cores: {}", self.available_cores);
        println!("   Available parallelism: {}", self.available_parallelism);
    }
}
