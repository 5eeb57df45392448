//! # lockweave CLI
//!
//! This is the binary entry point for the `lockweave` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging from the global `--log-level` flag.
//! - Dispatching to the subcommand and reporting top-level errors.
//!
//! All locking logic lives in the `lockweave` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
