//! # Configuration
//!
//! Settings that shape a lock run without being part of the environment
//! specification. They are read from `.lockweave.yaml` (or the file given with
//! `--config`), and individual CLI flags override the file.
//!
//! ```yaml
//! unconditional_category: main
//! virtual_prefix: "__"
//! candidate_policy: prefer-system
//! strict_metadata: false
//! prune_unreachable: true
//! ```
//!
//! Every key is optional; missing keys take the values in [`crate::defaults`].

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_CONFIG_FILE, UNCONDITIONAL_CATEGORY, VIRTUAL_PREFIX};
use crate::error::{Error, Result};

/// What to do when both managers provide the same logical package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidatePolicy {
    /// Keep the system manager's package and drop the language one.
    #[default]
    PreferSystem,
    /// Keep the language manager's package and drop the system one.
    PreferLanguage,
    /// Keep both; both are categorized and both are locked.
    KeepAll,
}

impl fmt::Display for CandidatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferSystem => write!(f, "prefer-system"),
            Self::PreferLanguage => write!(f, "prefer-language"),
            Self::KeepAll => write!(f, "keep-all"),
        }
    }
}

impl FromStr for CandidatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prefer-system" => Ok(Self::PreferSystem),
            "prefer-language" => Ok(Self::PreferLanguage),
            "keep-all" => Ok(Self::KeepAll),
            other => Err(Error::ConfigParse {
                message: format!("Unknown candidate policy '{}'", other),
                hint: Some("expected prefer-system, prefer-language or keep-all".to_string()),
            }),
        }
    }
}

/// Settings for one lock run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockConfig {
    /// Category required regardless of optional extras; broader sets are
    /// truncated to it.
    pub unconditional_category: String,
    /// Names starting with this prefix are platform capabilities, exempt
    /// from referential-integrity checks.
    pub virtual_prefix: String,
    pub candidate_policy: CandidatePolicy,
    /// Fail instead of warn when a package lacks a URL or checksum.
    pub strict_metadata: bool,
    /// Drop packages no root reaches instead of failing validation.
    pub prune_unreachable: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            unconditional_category: UNCONDITIONAL_CATEGORY.to_string(),
            virtual_prefix: VIRTUAL_PREFIX.to_string(),
            candidate_policy: CandidatePolicy::default(),
            strict_metadata: false,
            prune_unreachable: true,
        }
    }
}

/// Parse configuration YAML. An empty document yields the defaults.
pub fn parse(yaml: &str) -> Result<LockConfig> {
    if yaml.trim().is_empty() {
        return Ok(LockConfig::default());
    }
    let config: LockConfig = serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(
            "valid keys: unconditional_category, virtual_prefix, candidate_policy, strict_metadata, prune_unreachable"
                .to_string(),
        ),
    })?;
    if config.unconditional_category.trim().is_empty() {
        return Err(Error::ConfigParse {
            message: "unconditional_category must not be empty".to_string(),
            hint: None,
        });
    }
    Ok(config)
}

/// Load configuration from a file.
pub fn from_file(path: &Path) -> Result<LockConfig> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Resolve the configuration for a run: the explicit file if given, else
/// `.lockweave.yaml` in `working_dir` if present, else the defaults.
pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<LockConfig> {
    if let Some(path) = explicit {
        debug!("Loading configuration from {}", path.display());
        return from_file(path);
    }
    let implicit = working_dir.join(DEFAULT_CONFIG_FILE);
    if implicit.exists() {
        debug!("Loading configuration from {}", implicit.display());
        from_file(&implicit)
    } else {
        Ok(LockConfig::default())
    }
}
