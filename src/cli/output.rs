//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, PiSearchArgs};
use crate::error::Result;
use crate::index::{BuildSummary, IndexStats};
use crate::search::SearchResults;

/// Result structure for a successful validation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    pub index: String,
    pub psize: usize,
    pub valid: bool,
}

/// A result that knows how to print itself for people.
pub trait HumanOutput {
    fn write_human(&self, out: &mut dyn Write, args: &PiSearchArgs) -> io::Result<()>;
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &PiSearchArgs,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, message, result, args)
}

/// Write a result in the specified format to `out`.
pub fn write_result<T: Serialize + HumanOutput>(
    out: &mut dyn Write,
    message: &str,
    result: &T,
    args: &PiSearchArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                writeln!(out, "{message}")?;
            }
            result.write_human(out, args)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, result)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

impl HumanOutput for BuildSummary {
    fn write_human(&self, out: &mut dyn Write, args: &PiSearchArgs) -> io::Result<()> {
        if args.verbosity() == 0 {
            return Ok(());
        }
        writeln!(out, "Index built:")?;
        writeln!(out, "  psize:       {}", self.psize)?;
        writeln!(out, "  digits read: {}", self.digits_read)?;
        writeln!(out, "  positions:   {}", self.positions)?;
        writeln!(out, "  file size:   {} bytes", self.file_size)
    }
}

/// Hits print as `position: context`, one per line.
impl HumanOutput for SearchResults {
    fn write_human(&self, out: &mut dyn Write, args: &PiSearchArgs) -> io::Result<()> {
        if args.verbosity() > 1 {
            writeln!(
                out,
                "{}: {} hits ({:?}, {}ms)",
                self.pattern,
                self.hits.len(),
                self.mode,
                self.duration_ms
            )?;
        }
        for hit in &self.hits {
            if hit.context.is_empty() {
                writeln!(out, "{}", hit.position)?;
            } else {
                writeln!(out, "{}: {}", hit.position, hit.context)?;
            }
        }
        if self.truncated && args.verbosity() > 0 {
            writeln!(out, "(more results for {} omitted)", self.pattern)?;
        }
        Ok(())
    }
}

impl HumanOutput for IndexStats {
    fn write_human(&self, out: &mut dyn Write, _args: &PiSearchArgs) -> io::Result<()> {
        writeln!(out, "Index Statistics:")?;
        writeln!(out, "════════════════")?;
        writeln!(out, "psize: {}", self.psize)?;
        writeln!(out, "Buckets: {}", self.bucket_count)?;
        writeln!(out, "Non-empty buckets: {}", self.non_empty_buckets)?;
        writeln!(out, "Largest bucket: {}", self.largest_bucket)?;
        writeln!(out, "Positions: {}", self.position_count)?;
        writeln!(out, "File size: {} bytes", self.file_size)
    }
}

impl HumanOutput for ValidationResult {
    fn write_human(&self, out: &mut dyn Write, args: &PiSearchArgs) -> io::Result<()> {
        if args.verbosity() > 0 {
            writeln!(out, "{}: valid psize {} index", self.index, self.psize)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::Hit;
    use crate::search::SearchMode;
    use clap::Parser;

    fn results() -> SearchResults {
        SearchResults {
            pattern: "59".to_string(),
            mode: SearchMode::Indexed,
            hits: vec![Hit::new(4, "5926"), Hit::new(10, "")],
            truncated: false,
            duration_ms: 0,
        }
    }

    fn render(args: &[&str], value: &SearchResults) -> String {
        let args = PiSearchArgs::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        write_result(&mut out, "Search results", value, &args).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_human_search_output() {
        let text = render(&["pisearch", "search", "59"], &results());
        assert_eq!(text, "4: 5926\n10\n");
    }

    #[test]
    fn test_json_search_output() {
        let text = render(&["pisearch", "-f", "json", "search", "59"], &results());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["pattern"], "59");
        assert_eq!(value["mode"], "indexed");
        assert_eq!(value["hits"][0]["position"], 4);
        assert_eq!(value["hits"][0]["context"], "5926");
    }
}
