//! git-lint - run linters on modified files and report only modified lines
//!
//! git-lint provides:
//! - Discovery of changed files and lines through git
//! - Per-extension linter configuration (YAML)
//! - Line filtering of linter output
//! - Text or JSON reports

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod backends;
mod cli;
mod core;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli::run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("fatal: {:#}", e);
            ExitCode::from(cli::exit_code_for(&e))
        }
    }
}
