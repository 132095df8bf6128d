//! treesync CLI
//!
//! Mirrors a local tree or renders a template tree onto a target directory.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::{Variant, run_reconcile};
use error::Result;

/// Exit code when the reconciliation itself failed
const EXIT_FAILED: i32 = 2;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_FAILED),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the reconciliation succeeded.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Copy(opts) => run_reconcile(Variant::Copy, &opts),
        Commands::Template(opts) => run_reconcile(Variant::Template, &opts),
    }
}
