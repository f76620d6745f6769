mod cli;
mod conf;
mod discover;
mod logging;
mod output;
mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use crate::cli::{Cli, Command};
use crate::conf::ReporterConfig;
use crate::logging::{init_tracing_basic, init_tracing_from_config};
use crate::output::{console, ReportWriter};

fn main() {
    let cli = Cli::parse();

    // Phase 1: thread-local tracing while the configuration loads
    let basic_tracing = init_tracing_basic();

    let config = match prepare_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    // Phase 2: free the default slot for the configured global subscriber
    drop(basic_tracing);
    if let Err(e) = init_tracing_from_config(&config.logging) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    info!("Starting log-reporter v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_command(cli.command, &config) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Defaults, files and environment, then command-line flags on top.
fn prepare_config(cli: &Cli) -> Result<ReporterConfig> {
    let mut config =
        ReporterConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.command.run_args().apply(&mut config);
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn run_command(command: Command, config: &ReporterConfig) -> Result<()> {
    match command {
        Command::Parse(args) => {
            let result = run::execute(&args.input, config)?;
            print!(
                "{}",
                console::render(
                    &result.analysis.summary(),
                    &result.ingest.metrics,
                    result.ingest.failures.len(),
                    result.elapsed,
                )
            );
        }
        Command::Report { run: args, output } => {
            let result = run::execute(&args.input, config)?;
            let summary = result.analysis.summary();

            let base = output.unwrap_or_else(|| PathBuf::from(&config.output.dir));
            let run_id = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
            let writer = ReportWriter::create(&base, &run_id, config.output.max_failed_line_chars)?;
            writer.write_summary(&summary)?;
            writer.write_failed(&result.ingest.failures)?;
            info!(
                files = result.files.len(),
                dir = %writer.run_dir().display(),
                "Report complete"
            );

            print!(
                "{}",
                console::render(
                    &summary,
                    &result.ingest.metrics,
                    result.ingest.failures.len(),
                    result.elapsed,
                )
            );
            println!();
            println!("Report written to {}", writer.run_dir().display());
        }
    }

    Ok(())
}
