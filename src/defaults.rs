//! Default values for lockweave configuration.
//!
//! This module provides centralized default values used across the library and
//! the commands, ensuring consistency and avoiding duplication.

/// Lockfile schema version written by this release.
pub const SCHEMA_VERSION: u32 = 1;

/// Default lockfile path, relative to the working directory.
///
/// Can be overridden by the `--lockfile` CLI flag or the `LOCKWEAVE_LOCKFILE`
/// environment variable.
pub const DEFAULT_LOCKFILE: &str = "lockweave.yml";

/// Default configuration file, read when present in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".lockweave.yaml";

/// Category label for dependencies required regardless of optional extras.
pub const UNCONDITIONAL_CATEGORY: &str = "main";

/// Prefix marking virtual packages (platform capabilities such as `__glibc`).
pub const VIRTUAL_PREFIX: &str = "__";
