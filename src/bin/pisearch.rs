//! pisearch CLI binary.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;

use pisearch::cli::args::*;
use pisearch::cli::commands::*;

fn main() {
    // Parse command line arguments using clap
    let args = PiSearchArgs::parse();

    // Set up logging based on verbosity
    Builder::new()
        .filter_level(args.log_level())
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
