//! Command-line interface for wordtally
//!
//! Parses arguments with clap, layers them over the file/env configuration,
//! and drives the benchmark through its states while printing progress.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod output;

pub use output::Output;

use crate::benchmark::Benchmark;
use crate::config::{CliOverrides, TallyConfig};
use crate::discovery::FileDiscovery;
use crate::reports::{self, ReportFormat};

/// wordtally - compare sequential and parallel word counting over a directory
#[derive(Parser, Debug)]
#[command(
    name = "wordtally",
    version,
    about = "Count word frequencies across text files, sequentially and in parallel",
    long_about = "Count word frequencies across text files. wordtally tokenizes every \
                  matching file in a directory twice, once on a single thread and once on a \
                  worker pool, then reports both timings, the speedup and the most frequent \
                  tokens."
)]
pub struct Cli {
    /// Directory containing the files to analyze
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Worker threads for the parallel run (default: available parallelism)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Tokens to show in the console summary
    #[arg(long, value_name = "K")]
    pub top: Option<usize>,

    /// Tokens to write to the report file
    #[arg(long, value_name = "K")]
    pub report_top: Option<usize>,

    /// Report file path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Skip writing the report file
    #[arg(long)]
    pub no_report: bool,

    /// Report file format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// File extensions to include (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub extensions: Option<Vec<String>>,

    /// Cancel the parallel run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Milliseconds to wait for workers after a cancellation
    #[arg(long, value_name = "MS")]
    pub grace_period: Option<u64>,

    /// Exit with an error when no files are found
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Show progress bars
    #[arg(long)]
    pub progress: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", env = "WORDTALLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Flags the user actually passed, as a config layer
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides::default();
        overrides.discovery.extensions = self.extensions.clone();
        overrides.pool.threads = self.threads;
        overrides.pool.timeout_secs = self.timeout;
        overrides.pool.grace_period_ms = self.grace_period;
        overrides.report.console_top = self.top;
        overrides.report.report_top = self.report_top;
        overrides.report.output = self.output.clone();
        overrides.report.format = self.format;
        overrides.report.write_report = self.no_report.then_some(false);
        overrides.run.fail_on_empty = self.fail_on_empty.then_some(true);
        overrides.run.progress = self.progress.then_some(true);
        overrides
    }

    pub fn run(self) -> Result<ExitCode> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        let config = TallyConfig::load(self.config.as_deref(), Some(&self.overrides()))?;
        let directory = &self.directory;

        let discovery = FileDiscovery::new(&config.discovery.extensions);
        let mut bench = Benchmark::new(discovery, config.pool_config())
            .with_progress(config.run.progress && !self.quiet);

        let tasks = bench.discover(directory)?;
        output.info(&format!(
            "Discovered {} .{} files to process in {}",
            tasks.len(),
            config.discovery.extensions.join("/."),
            directory.display()
        ));

        if tasks.is_empty() {
            output.warning("No matching files found. Exiting.");
            // Walk the empty batch through both runs so the benchmark still ends in `Done`
            let sequential = bench.run_sequential(&tasks)?;
            let parallel = bench.run_parallel(&tasks)?;
            bench.compare(directory, &tasks, sequential, parallel)?;
            bench.complete().context("Failed to finish benchmark")?;
            return Ok(if config.run.fail_on_empty {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }

        output.section_header("=== Running sequential analysis ===");
        let sequential = bench.run_sequential(&tasks)?;
        output.key_value("Sequential run time:", &format!("{} ms", sequential.elapsed_ms()), false);

        output.section_header(&format!(
            "=== Running parallel analysis with {} threads ===",
            bench.threads()
        ));
        let parallel = bench.run_parallel(&tasks)?;
        output.key_value("Parallel run time:", &format!("{} ms", parallel.elapsed_ms()), false);
        output.verbose(&format!(
            "Pool: {} workers, {} finished, {} dropped",
            parallel.pool.workers, parallel.pool.finished, parallel.pool.dropped
        ));

        let comparison = bench.compare(directory, &tasks, sequential, parallel)?;
        output.summary(&comparison, config.report.console_top);

        if config.report.write_report {
            let path = &config.report.output;
            match reports::write_report(&comparison, config.report.format, config.report.report_top, path) {
                Ok(()) => output.success(&format!("Results written to {}", path.display())),
                Err(e) => {
                    tracing::error!("{}", e);
                    output.error(&e.to_string());
                }
            }
        }

        bench.complete().context("Failed to finish benchmark")?;
        output.success("Done");
        Ok(ExitCode::SUCCESS)
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // A subscriber may already be installed when embedded; keep the existing one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_long_help_describes_tool() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Count word frequencies"));
        assert!(help.contains("--threads"));
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let cli = Cli::parse_from(["wordtally", "logs"]);
        let overrides = cli.overrides();
        assert!(overrides.pool.threads.is_none());
        assert!(overrides.report.write_report.is_none());
        assert!(overrides.run.fail_on_empty.is_none());

        let value = serde_json::to_value(&overrides).unwrap();
        assert_eq!(value["pool"], serde_json::json!({}));
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::parse_from([
            "wordtally",
            "logs",
            "--threads",
            "3",
            "--no-report",
            "--format",
            "json",
            "--extensions",
            "txt,log",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);

        let overrides = cli.overrides();
        assert_eq!(overrides.pool.threads, Some(3));
        assert_eq!(overrides.report.write_report, Some(false));
        assert_eq!(overrides.report.format, Some(ReportFormat::Json));
        assert_eq!(
            overrides.discovery.extensions,
            Some(vec!["txt".to_string(), "log".to_string()])
        );
    }
}
