//! Command implementations for the pisearch CLI.

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SearchConfig;
use crate::error::{PiSearchError, Result};
use crate::index::{IndexBuilder, IndexFile};
use crate::search::{SearchOptions, Searcher};

/// Execute a CLI command.
pub fn execute_command(args: PiSearchArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Build(build_args) => build_index(build_args, config, &args),
        Command::Search(search_args) => search_patterns(search_args, config, &args),
        Command::Scan(scan_args) => scan_patterns(scan_args, config, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &config, &args),
        Command::Validate(validate_args) => validate_index(validate_args, &config, &args),
    }
}

/// Load the configuration file named on the command line, or the defaults.
fn load_config(args: &PiSearchArgs) -> Result<SearchConfig> {
    match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            SearchConfig::from_file(path)
        }
        None => Ok(SearchConfig::default()),
    }
}

/// Build an index.
fn build_index(args: &BuildArgs, mut config: SearchConfig, cli_args: &PiSearchArgs) -> Result<()> {
    if let Some(psize) = args.psize {
        config.psize = psize;
    }
    config.validate()?;

    if args.index.exists() && !args.force {
        return Err(PiSearchError::invalid_config(format!(
            "{} already exists. Use --force to overwrite.",
            args.index.display()
        )));
    }

    let builder = IndexBuilder::new(config.build_config())?;
    let summary = builder.build(&args.index, &args.digits)?;

    output_result("Index built successfully", &summary, cli_args)
}

/// Search with the index, falling back to a scan when it is missing.
fn search_patterns(args: &SearchArgs, config: SearchConfig, cli_args: &PiSearchArgs) -> Result<()> {
    let index = if args.no_index {
        None
    } else {
        Some(args.index.as_path())
    };
    let options = SearchOptions {
        context: args.context,
        limit: args.limit,
    };
    run_searches(&args.digits, index, &args.patterns, &options, config, cli_args)
}

/// Scan the digit file without touching any index.
fn scan_patterns(args: &ScanArgs, config: SearchConfig, cli_args: &PiSearchArgs) -> Result<()> {
    let options = SearchOptions {
        context: args.context,
        limit: args.limit,
    };
    run_searches(&args.digits, None, &args.patterns, &options, config, cli_args)
}

fn run_searches(
    digits: &std::path::Path,
    index: Option<&std::path::Path>,
    patterns: &[String],
    options: &SearchOptions,
    config: SearchConfig,
    cli_args: &PiSearchArgs,
) -> Result<()> {
    let mut searcher = Searcher::open(digits, index, config)?;
    info!("Searching {} pattern(s) ({:?})", patterns.len(), searcher.mode());

    for pattern in patterns {
        let results = searcher.search(pattern, options)?;
        output_result("Search results", &results, cli_args)?;
    }

    searcher.close()
}

/// Show index statistics.
fn show_stats(args: &StatsArgs, config: &SearchConfig, cli_args: &PiSearchArgs) -> Result<()> {
    let mut index = IndexFile::open(&args.index, &config.storage)?;
    let stats = index.stats()?;
    index.close()?;

    output_result("Index statistics", &stats, cli_args)
}

/// Validate an index file.
fn validate_index(args: &ValidateArgs, config: &SearchConfig, cli_args: &PiSearchArgs) -> Result<()> {
    let mut index = IndexFile::open(&args.index, &config.storage)?;
    index.validate()?;
    let result = ValidationResult {
        index: args.index.display().to_string(),
        psize: index.psize(),
        valid: true,
    };
    index.close()?;

    output_result("Index is valid", &result, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn run(args: &[&str]) -> Result<()> {
        execute_command(PiSearchArgs::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_build_search_stats_validate() {
        let dir = TempDir::new().unwrap();
        let digits = dir.path().join("pi.txt");
        let index = dir.path().join("pi.index");
        fs::write(&digits, ".14159265358979323846\n").unwrap();
        let digits = digits.to_str().unwrap();
        let index = index.to_str().unwrap();

        run(&["pisearch", "-q", "build", "-i", digits, "-d", index, "-n", "2"]).unwrap();
        run(&["pisearch", "-q", "search", "-i", digits, "-d", index, "79", "2643"]).unwrap();
        run(&["pisearch", "-q", "scan", "-i", digits, "79"]).unwrap();
        run(&["pisearch", "-q", "-f", "json", "stats", "-d", index]).unwrap();
        run(&["pisearch", "-q", "validate", "-d", index]).unwrap();

        // Refuses to overwrite without --force.
        assert!(matches!(
            run(&["pisearch", "-q", "build", "-i", digits, "-d", index, "-n", "2"]),
            Err(PiSearchError::InvalidConfig(_))
        ));
        run(&["pisearch", "-q", "build", "-i", digits, "-d", index, "-n", "3", "--force"]).unwrap();
    }

    #[test]
    fn test_bad_psize_and_pattern() {
        let dir = TempDir::new().unwrap();
        let digits = dir.path().join("pi.txt");
        fs::write(&digits, ".1415").unwrap();
        let digits = digits.to_str().unwrap();
        let index = dir.path().join("pi.index");
        let index = index.to_str().unwrap();

        assert!(matches!(
            run(&["pisearch", "-q", "build", "-i", digits, "-d", index, "-n", "12"]),
            Err(PiSearchError::InvalidConfig(_))
        ));
        assert!(matches!(
            run(&["pisearch", "-q", "scan", "-i", digits, "1x"]),
            Err(PiSearchError::InvalidPattern(_))
        ));
    }
}
