//! # `cafe` Entry Point
//!
//! Parses arguments, sets up logging and runs one command.
//!
//! ## Exit Status
//! - `0` success
//! - `1` the command failed (`error [CODE]: message` on stderr)
//! - `2` the database could not be opened (`PERSISTENCE_UNAVAILABLE`)
//!
//! The actual work is in lib.rs for testability.

use std::process::ExitCode;

use clap::Parser;

use cafe_console::cli::Cli;
use cafe_console::{exit_code, init_tracing, output, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", output::error(&err, json));
            ExitCode::from(exit_code(&err))
        }
    }
}
