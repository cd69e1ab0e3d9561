//! Ladder CLI: the test driver for the ladder scoreboard.
//!
//! Provides `ladder list` to show the registered test cases and `ladder run`
//! to run a selection of them against the behavioral model of the block.

#![warn(missing_docs)]

mod cases;
mod registry;
mod run;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Ladder: a cycle-accurate scoreboard for the head-tracking block.
#[derive(Parser, Debug)]
#[command(name = "ladder", version, about = "Ladder scoreboard test driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Echo every log record, down to debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `ladder.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Write a VCD waveform per case into the configured waveform directory.
    #[arg(long, global = true)]
    pub vcd: bool,

    /// Abort a case on its first failed check.
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Report format.
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered test cases.
    List,
    /// Run test cases.
    Run(RunArgs),
}

/// Arguments for the `ladder run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Names of the cases to run.
    pub names: Vec<String>,

    /// Run every registered case.
    #[arg(long, conflicts_with = "names")]
    pub all: bool,

    /// Substring filter for case names.
    #[arg(long)]
    pub filter: Option<String>,

    /// Seed for randomized cases.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to echo debug records.
    pub verbose: bool,
    /// Optional path to a custom config file or directory.
    pub config: Option<String>,
    /// Whether to write waveforms.
    pub vcd: bool,
    /// Whether the first failed check aborts a case.
    pub fail_fast: bool,
    /// Report format.
    pub format: ReportFormat,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        vcd: cli.vcd,
        fail_fast: cli.fail_fast,
        format: cli.format,
    };

    let result = match cli.command {
        Command::List => run::list(&global),
        Command::Run(ref args) => run::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
