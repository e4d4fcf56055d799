mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::Context;
use backsweep_core::{RunMode, RunResult, SweepEngine};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::error;

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match backsweep_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let exit_code = match args.command {
        Some(Commands::Run {
            dry_run,
            yes,
            report,
        }) => {
            if !dry_run && !yes {
                match prompt_confirm(
                    "This run will permanently delete local files with valid backups. Continue?",
                    Some(false),
                ) {
                    Ok(true) => {}
                    _ => process::exit(0),
                }
            }
            let mode = if dry_run { RunMode::DryRun } else { RunMode::Full };
            run_pipeline(&config, mode, report.as_deref())
        }
        Some(Commands::Validate { report }) => {
            run_pipeline(&config, RunMode::ValidateOnly, report.as_deref())
        }
        Some(Commands::CacheStats) => match open_store(&config) {
            Ok(db) => match db.cache_stats() {
                Ok((fingerprints, verdicts)) => {
                    println!(
                        "{} fingerprints, {} verdicts in {}",
                        fingerprints, verdicts, config.verdict_db
                    );
                    0
                }
                Err(e) => {
                    error!("Error reading cache stats: {}", e);
                    1
                }
            },
            Err(e) => {
                error!("Error opening verdict store: {}", e);
                1
            }
        },
        Some(Commands::ClearCache) => {
            match prompt_confirm(
                "Are you SURE you want to COMPLETELY DELETE the verdict store?",
                Some(false),
            ) {
                Ok(true) => match open_store(&config) {
                    Ok(db) => {
                        if let Err(e) = db.truncate_all() {
                            error!("Error truncating verdict store: {}", e);
                            1
                        } else {
                            println!("Verdict store cleared");
                            0
                        }
                    }
                    Err(e) => {
                        error!("Error opening verdict store: {}", e);
                        1
                    }
                },
                _ => 0,
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            0
        }
        None => {
            let _ = Cli::command().print_long_help();
            0
        }
    };

    process::exit(exit_code);
}

fn open_store(config: &backsweep_core::AppConfig) -> anyhow::Result<backsweep_core::storage::Database> {
    backsweep_core::storage::Database::open(&config.verdict_db)
        .with_context(|| format!("opening verdict store {}", config.verdict_db))
}

fn run_pipeline(
    config: &backsweep_core::AppConfig,
    mode: RunMode,
    report_path: Option<&Path>,
) -> i32 {
    let engine = SweepEngine::new(config.clone());
    let reporter = CliReporter::new();

    let result = match engine.run(mode, &reporter) {
        Ok(result) => result,
        Err(err) => {
            error!("Error: {}", err);
            return 1;
        }
    };

    if let Some(path) = report_path {
        if let Err(e) = backsweep_core::report::write_csv(path, &result.reports) {
            error!("Error writing report: {}", e);
            return 1;
        }
    }

    print_summary(&result, mode);

    if result.is_clean() {
        0
    } else {
        1
    }
}

fn print_summary(result: &RunResult, mode: RunMode) {
    println!();
    println!(
        "Scan: {}, Validate: {}, Execute: {}",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.validate_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.execute_duration.as_secs_f64()).green(),
    );
    println!(
        "{} files scanned, {} with valid backups, {} invalid, {} missing, {} indeterminate, {} errors",
        result.total_files,
        format!("{}", result.valid_files).green(),
        format_count(result.invalid_files),
        format_count(result.missing_files),
        format_count(result.indeterminate_files),
        format_count(result.errored_files),
    );
    if mode != RunMode::ValidateOnly {
        println!(
            "{} eligible for deletion, {} deleted, {} failed",
            result.eligible,
            format!("{}", result.deleted).green(),
            format_count(result.delete_failed),
        );
    }
    if !result.is_clean() {
        println!("{}", "Some files could not be validated or cleaned.".red());
    }
}

fn format_count(count: usize) -> ColoredString {
    if count > 0 {
        count.to_string().red()
    } else {
        count.to_string().normal()
    }
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
