//! Entry point for the ERA5 ETL batch.
//! Parses the CLI, sets up logging and either inspects one year's sources or
//! runs the whole year range.

use clap::Parser;
use era5_etl::cli::Args;
use era5_etl::logging::init_logging;
use era5_etl::metadata::describe_year;
use era5_etl::parallel::get_parallel_info;
use era5_etl::run_batch;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.to_config();

    if let Some(year) = args.inspect {
        for summary in describe_year(&config, year)? {
            summary.print();
        }
        return Ok(());
    }

    if args.verbose {
        get_parallel_info(config.workers).print_info();
    }

    let report = run_batch(&config)?;
    report.print_summary();

    Ok(())
}
