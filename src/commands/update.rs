//! # Update Command Implementation
//!
//! This module implements the `update` subcommand, which refreshes selected
//! packages of an existing lockfile.
//!
//! The resolution document carries the re-resolved packages only. Everything
//! else is taken from the current lockfile, categories are recomputed from
//! scratch, and packages that nothing requires any more are dropped.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use lockweave::defaults::DEFAULT_LOCKFILE;
use lockweave::output::{OutputConfig, Status};
use lockweave::phases::{orchestrator, write, LockMode};

use super::{read_document, read_lockfile, ConfigArgs};

/// Refresh selected packages in an existing lockfile
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Resolution document with the re-resolved packages.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Lockfile to update in place.
    #[arg(short, long, value_name = "FILE", env = "LOCKWEAVE_LOCKFILE", default_value = DEFAULT_LOCKFILE)]
    pub lockfile: PathBuf,

    /// Package to refresh. May be repeated. A named package that the
    /// resolution document no longer contains is removed.
    #[arg(short, long = "update", value_name = "NAME")]
    pub update: Vec<String>,

    /// Print the lockfile to stdout instead of writing it.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub settings: ConfigArgs,
}

/// Execute the `update` command.
pub fn execute(args: UpdateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config = args.settings.load()?;
    let document = read_document(&args.input)?;

    if !args.lockfile.exists() {
        bail!(
            "No lockfile at {}; run `lockweave lock` first",
            args.lockfile.display()
        );
    }
    let previous = read_lockfile(&args.lockfile)?;

    let platforms = document.spec.platforms();
    let lockfile = orchestrator::execute(
        &document,
        &config,
        LockMode::Update {
            previous: &previous,
            targets: &args.update,
        },
        &platforms,
        Some(&previous),
    )?;

    if args.dry_run {
        print!("{}", write::render(&lockfile)?);
        return Ok(());
    }
    write::execute(&lockfile, &args.lockfile, &config)?;

    for (platform, section) in &lockfile.platforms {
        let before = previous
            .platform(platform)
            .map(|s| s.packages.len())
            .unwrap_or(0);
        println!(
            "{} {}: {} package(s) (was {})",
            out.marker(Status::Ok),
            platform,
            section.packages.len(),
            before
        );
    }
    Ok(())
}
