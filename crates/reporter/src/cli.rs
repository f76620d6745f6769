use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use engine::IngestMode;

use crate::conf::ReporterConfig;

#[derive(Parser, Debug)]
#[command(
    name = "log-reporter",
    version,
    about = "Parse mixed-format service logs and report latency, status and error-rate anomalies"
)]
pub struct Cli {
    /// Path to a configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "LOGREPORT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze logs and print a summary to stdout
    Parse(RunArgs),

    /// Analyze logs and write summary.json and events_failed.csv
    Report {
        #[command(flatten)]
        run: RunArgs,

        /// Base output directory; a timestamped run directory is created inside
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    pub fn run_args(&self) -> &RunArgs {
        match self {
            Command::Parse(run) | Command::Report { run, .. } => run,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Log file, or directory to scan for log files
    #[arg(long, short)]
    pub input: PathBuf,

    /// Abort on the first line that cannot be parsed
    #[arg(long)]
    pub strict: bool,

    /// Number of slowest requests to keep
    #[arg(long)]
    pub top: Option<usize>,
}

impl RunArgs {
    /// Flags take precedence over file and environment configuration.
    pub fn apply(&self, config: &mut ReporterConfig) {
        if self.strict {
            config.ingest.mode = IngestMode::Strict;
        }
        if let Some(top) = self.top {
            config.analysis.top_n = top;
        }
    }
}
