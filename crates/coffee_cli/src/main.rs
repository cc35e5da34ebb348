//! Demo runner for the coffee store.
//!
//! # Responsibility
//! - Resolve configuration from the environment and start logging.
//! - Run the insert/sort/re-price/query/delete walkthrough and print what
//!   each stage observed.

use coffee_core::{
    core_version, init_logging, run_demo, AppConfig, CoffeeService, DemoReport,
    SqliteCoffeeRepository,
};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("coffee_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<DemoReport, String> {
    let config = AppConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = config
        .open_db()
        .map_err(|err| format!("database open failed: {err}"))?;
    let repo = SqliteCoffeeRepository::try_new(&conn, config.money_codec())
        .map_err(|err| format!("repository init failed: {err}"))?;
    let service = CoffeeService::new(repo);

    run_demo(&service, config.currency).map_err(|err| err.to_string())
}

fn print_report(report: &DemoReport) {
    println!("coffee_core version={}", core_version());
    for coffee in &report.sorted {
        println!("Saved {coffee}");
    }
    println!("Updated {}", report.repriced);
    for coffee in &report.found {
        println!("Found {coffee}");
    }
    println!("Remaining {}", report.remaining);
}
