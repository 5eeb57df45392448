//! # Lock Command Implementation
//!
//! This module implements the `lock` subcommand, which turns a resolution
//! document into a lockfile.
//!
//! ## Functionality
//!
//! - **Incremental**: Platforms whose content hash matches the existing
//!   lockfile are carried over untouched; `--force` relocks everything.
//! - **All or Nothing**: Platforms are locked in parallel. If any of them
//!   fails, every failure is reported and the lockfile on disk is left as it
//!   was.
//! - **Dry Run**: `--dry-run` prints the lockfile instead of writing it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lockweave::defaults::DEFAULT_LOCKFILE;
use lockweave::lockfile::Lockfile;
use lockweave::output::{OutputConfig, Status};
use lockweave::phases::{orchestrator, write, LockMode};

use super::{read_document, ConfigArgs};

/// Lock every platform of a resolution document
#[derive(Args, Debug)]
pub struct LockArgs {
    /// Resolution document (YAML or JSON) with the specification and the
    /// resolver outputs.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Lockfile to write.
    #[arg(short, long, value_name = "FILE", env = "LOCKWEAVE_LOCKFILE", default_value = DEFAULT_LOCKFILE)]
    pub lockfile: PathBuf,

    /// Relock every platform, even those whose content hash is unchanged.
    #[arg(long)]
    pub force: bool,

    /// Print the lockfile to stdout instead of writing it.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub settings: ConfigArgs,
}

/// Execute the `lock` command.
pub fn execute(args: LockArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config = args.settings.load()?;
    let document = read_document(&args.input)?;

    let previous = Lockfile::from_file_if_exists(&args.lockfile)
        .with_context(|| format!("Failed to read lockfile {}", args.lockfile.display()))?;
    let platforms = orchestrator::plan_platforms(&document, previous.as_ref(), args.force)?;

    if platforms.is_empty() && !args.dry_run {
        println!(
            "{} {} is up to date ({} platform(s))",
            out.marker(Status::Ok),
            args.lockfile.display(),
            document.spec.platforms().len()
        );
        return Ok(());
    }

    let lockfile = orchestrator::execute(
        &document,
        &config,
        LockMode::Fresh,
        &platforms,
        previous.as_ref(),
    )?;

    if args.dry_run {
        print!("{}", write::render(&lockfile)?);
        return Ok(());
    }

    write::execute(&lockfile, &args.lockfile, &config)?;
    for (platform, section) in &lockfile.platforms {
        let status = if platforms.contains(platform) {
            "locked"
        } else {
            "unchanged"
        };
        println!(
            "{} {}: {} package(s), {}",
            out.marker(Status::Ok),
            platform,
            section.packages.len(),
            status
        );
    }
    println!(
        "{} Wrote {}",
        out.marker(Status::Info),
        args.lockfile.display()
    );
    Ok(())
}
