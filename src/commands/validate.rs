//! # Validate Command Implementation
//!
//! Checks an existing lockfile on its own, without a resolution document:
//! every edge resolves inside its platform section, every package carries a
//! category, packages sit in the right platform section, and no manager lists
//! a package twice.
//!
//! This command is read-only.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use lockweave::defaults::DEFAULT_LOCKFILE;
use lockweave::output::{OutputConfig, Status};
use lockweave::phases::validate;

use super::{read_lockfile, ConfigArgs};

/// Check a lockfile for internal consistency
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Lockfile to validate.
    #[arg(short, long, value_name = "FILE", env = "LOCKWEAVE_LOCKFILE", default_value = DEFAULT_LOCKFILE)]
    pub lockfile: PathBuf,

    #[command(flatten)]
    pub settings: ConfigArgs,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config = args.settings.load()?;
    let lockfile = read_lockfile(&args.lockfile)?;

    let mut failed = 0;
    for (platform, section) in &lockfile.platforms {
        let problems = validate::section_problems(platform, section, &config);
        if problems.is_empty() {
            println!(
                "{} {}: {} package(s)",
                out.marker(Status::Ok),
                platform,
                section.packages.len()
            );
            continue;
        }
        failed += 1;
        println!(
            "{} {}: {} problem(s)",
            out.marker(Status::Error),
            platform,
            problems.len()
        );
        for problem in problems {
            println!("    {}", problem);
        }
    }

    if failed > 0 {
        bail!(
            "{} is inconsistent on {} platform(s)",
            args.lockfile.display(),
            failed
        );
    }
    println!(
        "{} {} is consistent",
        out.marker(Status::Ok),
        args.lockfile.display()
    );
    Ok(())
}
