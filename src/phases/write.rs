//! Phase 4: Writing to Disk
//!
//! The final phase of the lock pipeline. It persists a lockfile that has
//! passed validation.
//!
//! ## Process
//!
//! 1.  **Validate**: Every platform section is checked again. A lockfile that
//!     fails is never written.
//!
//! 2.  **Serialize**: The lockfile is rendered to YAML behind a short
//!     generated-file header.
//!
//! 3.  **Atomic Replace**: The text goes to a temporary file in the target's
//!     directory, which is then renamed over the target. A crash mid-write
//!     leaves the previous lockfile intact.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::info;
use tempfile::NamedTempFile;

use super::validate;
use crate::config::LockConfig;
use crate::error::{Error, Result};
use crate::lockfile::Lockfile;

const HEADER: &str = "\
# This lockfile was generated by lockweave. Do not edit it by hand.
# Re-generate it with `lockweave lock`, or refresh single packages with
# `lockweave update <name>...`.
";

/// Render the on-disk text of a lockfile.
pub fn render(lockfile: &Lockfile) -> Result<String> {
    let body = lockfile.to_yaml_string()?;
    Ok(format!("{}{}", HEADER, body))
}

/// Execute Phase 4: validate and atomically write `lockfile` to `path`.
pub fn execute(lockfile: &Lockfile, path: &Path, config: &LockConfig) -> Result<()> {
    validate::validate_lockfile(lockfile, config)?;
    let text = render(lockfile)?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)?;

    let mut staging = NamedTempFile::new_in(directory)?;
    staging.write_all(text.as_bytes())?;
    staging.as_file().sync_all()?;
    staging.persist(path).map_err(|e| Error::Io(e.error))?;

    info!(
        "Wrote {} package(s) across {} platform(s) to {}",
        lockfile.package_count(),
        lockfile.platforms.len(),
        path.display()
    );
    Ok(())
}
