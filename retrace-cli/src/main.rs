//! Retrace CLI: drawdown and run-up analysis of trading journals.
//!
//! Commands:
//! - `analyze`: analyze one ledger CSV, print Markdown or JSON, optionally save artifacts
//! - `batch`: analyze many ledgers in parallel, one summary line each

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use retrace_core::{AnalysisConfig, FlatPolicy, RankBy};
use retrace_report::{analyze_batch, analyze_file, export_json, generate_markdown, save_report, Report};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "retrace_cli=info,retrace_report=info";

#[derive(Parser)]
#[command(name = "retrace", about = "Retrace: drawdown and run-up analysis for trading journals")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single ledger CSV.
    Analyze {
        /// Ledger CSV (opened_at + profit or balance columns).
        csv: PathBuf,

        #[command(flatten)]
        options: AnalysisArgs,

        /// Write report.json, series.csv, runs.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON instead of Markdown.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Analyze many ledger CSVs in parallel.
    Batch {
        /// Ledger CSVs.
        #[arg(required = true)]
        csvs: Vec<PathBuf>,

        #[command(flatten)]
        options: AnalysisArgs,

        /// Save an artifact bundle per successful file under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Analysis options shared by every command. Flags override the config file.
#[derive(Args)]
struct AnalysisArgs {
    /// TOML analysis config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of runs in each ranked table.
    #[arg(long)]
    top: Option<usize>,

    /// Ranking: severity, duration, or operations.
    #[arg(long)]
    rank_by: Option<RankBy>,

    /// What an exact zero does to an open run.
    #[arg(long, value_enum)]
    flat: Option<FlatArg>,

    /// Drop deposit and withdrawal rows before analysis.
    #[arg(long, default_value_t = false)]
    exclude_cash_flows: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FlatArg {
    Close,
    Pause,
}

impl From<FlatArg> for FlatPolicy {
    fn from(arg: FlatArg) -> Self {
        match arg {
            FlatArg::Close => FlatPolicy::Close,
            FlatArg::Pause => FlatPolicy::Pause,
        }
    }
}

impl AnalysisArgs {
    fn resolve(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                AnalysisConfig::from_toml(&content)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => AnalysisConfig::default(),
        };

        if let Some(top) = self.top {
            config.top_n = top;
        }
        if let Some(rank_by) = self.rank_by {
            config.rank_by = rank_by;
        }
        if let Some(flat) = self.flat {
            config.run_policy.flat = flat.into();
        }
        if self.exclude_cash_flows {
            config.exclude_cash_flows = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Analyze {
            csv,
            options,
            output_dir,
            json,
        } => run_analyze(&csv, &options, output_dir.as_deref(), json),
        Commands::Batch {
            csvs,
            options,
            output_dir,
        } => run_batch(&csvs, &options, output_dir.as_deref()),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "retrace_cli=debug,retrace_report=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_analyze(csv: &Path, options: &AnalysisArgs, output_dir: Option<&Path>, json: bool) -> Result<ExitCode> {
    let config = options.resolve()?;
    let report = analyze_file(csv, &config)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print!("{}", generate_markdown(&report));
    }

    if let Some(dir) = output_dir {
        let run_dir = save_report(&report, dir)?;
        info!(dir = %run_dir.display(), "artifacts saved");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_batch(csvs: &[PathBuf], options: &AnalysisArgs, output_dir: Option<&Path>) -> Result<ExitCode> {
    let config = options.resolve()?;
    let outcomes = analyze_batch(csvs, &config);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                println!("{}: {}", outcome.path.display(), summary_line(report));
                if let Some(dir) = output_dir {
                    save_report(report, dir)?;
                }
            }
            Err(e) => {
                failed += 1;
                println!("{}: error: {e:#}", outcome.path.display());
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} files failed", outcomes.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn summary_line(report: &Report) -> String {
    let a = &report.analysis;
    format!(
        "{} rows, {} drawdowns (max {:.2}%), {} run-ups (max {:.2}%)",
        report.row_count,
        a.drawdowns.len(),
        a.max_drawdown,
        a.runups.len(),
        a.max_runup
    )
}
