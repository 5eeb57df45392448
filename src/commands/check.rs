//! # Check Command Implementation
//!
//! Compares the content hash of every platform in a resolution document with
//! the hash stored in the lockfile. Exits non-zero when any platform is stale,
//! which makes it usable as a CI gate.
//!
//! This command is read-only.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use lockweave::defaults::DEFAULT_LOCKFILE;
use lockweave::hash;
use lockweave::lockfile::{LockMetadata, Lockfile};
use lockweave::output::{OutputConfig, Status};

use super::read_document;

/// Report platforms whose lock is out of date
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Resolution document describing the current specification.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Lockfile to compare against.
    #[arg(short, long, value_name = "FILE", env = "LOCKWEAVE_LOCKFILE", default_value = DEFAULT_LOCKFILE)]
    pub lockfile: PathBuf,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let document = read_document(&args.input)?;
    let lockfile = match Lockfile::from_file_if_exists(&args.lockfile)? {
        Some(lockfile) => lockfile,
        None => {
            println!(
                "{} No lockfile at {}",
                out.marker(Status::Info),
                args.lockfile.display()
            );
            Lockfile::new(LockMetadata::default())
        }
    };

    let stale = hash::stale_platforms(&document.spec, &lockfile)?;
    for platform in document.spec.platforms() {
        if stale.contains(&platform) {
            println!("{} {}: needs relocking", out.marker(Status::Stale), platform);
        } else {
            println!("{} {}: up to date", out.marker(Status::Ok), platform);
        }
    }

    if !stale.is_empty() {
        bail!(
            "{} of {} platform(s) out of date: {}",
            stale.len(),
            document.spec.platforms().len(),
            stale.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_without_lockfile_reports_everything_stale() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("resolved.yaml");
        fs::write(
            &input,
            "spec:\n  dependencies:\n    linux-64: [{name: zlib}]\n    osx-64: [{name: zlib}]\n",
        )
        .unwrap();
        let err = execute(
            CheckArgs {
                input,
                lockfile: dir.path().join("missing.yml"),
            },
            "never",
        )
        .unwrap_err();
        assert!(err.to_string().contains("2 of 2 platform(s) out of date"));
    }
}
