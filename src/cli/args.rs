//! Command line argument parsing for the pisearch CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Default digit file, one leading byte followed by the digits of pi.
pub const DEFAULT_DIGITS_FILE: &str = "pi-billion.txt";

/// Default index file.
pub const DEFAULT_INDEX_FILE: &str = "pi.index";

/// pisearch - find digit strings in pi
#[derive(Parser, Debug, Clone)]
#[command(name = "pisearch")]
#[command(about = "Find digit strings in the digits of pi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PiSearchArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "PISEARCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PiSearchArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }

    /// Log level for the effective verbosity. `build` reports its progress
    /// unless `--quiet` is given.
    pub fn log_level(&self) -> LevelFilter {
        match (self.verbosity(), &self.command) {
            (0, _) => LevelFilter::Error,
            (1, Command::Build(_)) => LevelFilter::Info,
            (1, _) => LevelFilter::Warn,
            (2, _) => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build a bucket index from a digit file
    Build(BuildArgs),

    /// Search for patterns, using the index when it exists
    Search(SearchArgs),

    /// Search for patterns by scanning the digit file (no index)
    Scan(ScanArgs),

    /// Show index statistics
    Stats(StatsArgs),

    /// Validate index integrity
    Validate(ValidateArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Digit file to index
    #[arg(short = 'i', long, value_name = "DIGITS_FILE", default_value = DEFAULT_DIGITS_FILE)]
    pub digits: PathBuf,

    /// Index file to write
    #[arg(short = 'd', long, value_name = "INDEX_FILE", default_value = DEFAULT_INDEX_FILE)]
    pub index: PathBuf,

    /// Key width in digits (overrides the config file)
    #[arg(short = 'n', long)]
    pub psize: Option<usize>,

    /// Overwrite an existing index file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Patterns to search for
    #[arg(value_name = "PATTERN", required = true)]
    pub patterns: Vec<String>,

    /// Digit file
    #[arg(short = 'i', long, value_name = "DIGITS_FILE", default_value = DEFAULT_DIGITS_FILE)]
    pub digits: PathBuf,

    /// Index file
    #[arg(short = 'd', long, value_name = "INDEX_FILE", default_value = DEFAULT_INDEX_FILE)]
    pub index: PathBuf,

    /// Scan the digit file even if an index exists
    #[arg(long)]
    pub no_index: bool,

    /// Digits of context to show per hit
    #[arg(long)]
    pub context: Option<usize>,

    /// Maximum number of hits per pattern
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for scanning without an index
#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Patterns to search for
    #[arg(value_name = "PATTERN", required = true)]
    pub patterns: Vec<String>,

    /// Digit file
    #[arg(short = 'i', long, value_name = "DIGITS_FILE", default_value = DEFAULT_DIGITS_FILE)]
    pub digits: PathBuf,

    /// Digits of context to show per hit
    #[arg(long)]
    pub context: Option<usize>,

    /// Maximum number of hits per pattern
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for showing statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index file
    #[arg(short = 'd', long, value_name = "INDEX_FILE", default_value = DEFAULT_INDEX_FILE)]
    pub index: PathBuf,
}

/// Arguments for validation
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Index file
    #[arg(short = 'd', long, value_name = "INDEX_FILE", default_value = DEFAULT_INDEX_FILE)]
    pub index: PathBuf,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
