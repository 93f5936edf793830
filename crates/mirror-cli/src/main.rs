//! Mirror CLI
//!
//! Keeps a replica directory identical to a source directory, once or
//! continuously.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(args) => commands::run_daemon(args, cli.verbose),
        Commands::Once(args) => {
            logging::init(cli.verbose, None)?;
            commands::run_once(args)
        }
    }
}
