//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// lockweave - Assemble multi-platform lockfiles from resolver outputs
#[derive(Parser, Debug)]
#[command(name = "lockweave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lock every platform of a resolution document
    Lock(commands::lock::LockArgs),

    /// Refresh selected packages in an existing lockfile
    Update(commands::update::UpdateArgs),

    /// Report platforms whose lock is out of date
    Check(commands::check::CheckArgs),

    /// Check a lockfile for internal consistency
    Validate(commands::validate::ValidateArgs),

    /// Print the content hash of each platform
    Hash(commands::hash::HashArgs),

    /// Show the dependency tree of a locked platform
    Tree(commands::tree::TreeArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Lock(args) => commands::lock::execute(args, &self.color),
            Commands::Update(args) => commands::update::execute(args, &self.color),
            Commands::Check(args) => commands::check::execute(args, &self.color),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Hash(args) => commands::hash::execute(args),
            Commands::Tree(args) => commands::tree::execute(args, &self.color),
        }
    }
}

/// Log to stderr at `level`. `RUST_LOG` wins when the flag is left at its
/// default.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) if level == "info" => {
            builder.parse_filters(&filters);
        }
        _ => {
            builder.parse_filters(&format!("lockweave={}", level));
        }
    }
    builder.format_timestamp(None).format_target(false);
    // A logger may already be installed when commands run in-process.
    let _ = builder.try_init();
}
