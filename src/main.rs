//! Razencheck CLI entry point.

use clap::Parser;
use razencheck::cli::{self, Cli, EXIT_ERROR};
use razencheck::logging;

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
