//! # CLI Command Implementations
//!
//! Each subcommand of the `lockweave` tool lives in its own file with:
//! - An `Args` struct derived with `clap`.
//! - An `execute` function taking the parsed `Args` that calls into the
//!   `lockweave` library.
//!
//! Arguments shared by several commands are defined here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lockweave::config::{self, CandidatePolicy, LockConfig};
use lockweave::input::{self, ResolutionDocument};
use lockweave::lockfile::Lockfile;

pub mod check;
pub mod hash;
pub mod lock;
pub mod tree;
pub mod update;
pub mod validate;

/// Settings file plus the flags that override it.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Settings file. Defaults to `.lockweave.yaml` in the current directory
    /// when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Which candidate to keep when both managers provide a package
    /// (prefer-system, prefer-language, keep-all).
    #[arg(long, value_name = "POLICY")]
    pub candidate_policy: Option<CandidatePolicy>,

    /// Fail instead of warning when a package lacks a URL or checksum.
    #[arg(long)]
    pub strict_metadata: bool,

    /// Keep packages no root requires; validation then rejects them.
    #[arg(long)]
    pub no_prune: bool,
}

impl ConfigArgs {
    /// Load the settings file and apply flag overrides.
    pub fn load(&self) -> Result<LockConfig> {
        let working_dir = std::env::current_dir().context("Failed to read current directory")?;
        let mut settings = config::load(self.config.as_deref(), &working_dir)
            .context("Failed to load lockweave settings")?;
        if let Some(policy) = self.candidate_policy {
            settings.candidate_policy = policy;
        }
        if self.strict_metadata {
            settings.strict_metadata = true;
        }
        if self.no_prune {
            settings.prune_unreachable = false;
        }
        Ok(settings)
    }
}

/// Read a resolution document, naming the file on failure.
pub fn read_document(path: &std::path::Path) -> Result<ResolutionDocument> {
    input::from_file(path)
        .with_context(|| format!("Failed to read resolution document {}", path.display()))
}

/// Read a lockfile, naming the file on failure.
pub fn read_lockfile(path: &std::path::Path) -> Result<Lockfile> {
    Lockfile::from_file(path).with_context(|| format!("Failed to read lockfile {}", path.display()))
}
