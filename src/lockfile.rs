//! # Lockfile Schema
//!
//! The persisted artifact: a schema version tag, provenance metadata, and one
//! section per platform holding that platform's content hash and its ordered
//! package list.
//!
//! ```yaml
//! version: 1
//! metadata:
//!   channels: [conda-forge]
//!   sources: [environment.yml]
//!   platforms: [linux-64]
//! platforms:
//!   linux-64:
//!     content_hash: 5e1f...
//!     packages:
//!       - name: ipython
//!         version: 8.12.0
//!         manager: system
//!         platform: linux-64
//!         dependencies: {python: ">=3.8"}
//!         categories: [main]
//! ```
//!
//! Reading checks the schema version before anything else so an incompatible
//! file is reported as such rather than as a confusing field error. Writing
//! goes through [`crate::phases::write`], which validates first.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defaults::SCHEMA_VERSION;
use crate::error::{Error, Result};
use crate::package::LockedPackage;
use crate::spec::LockSpecification;

/// Provenance recorded alongside the packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl LockMetadata {
    pub fn from_spec(spec: &LockSpecification) -> Self {
        Self {
            channels: spec.channels.clone(),
            sources: spec.sources.clone(),
            platforms: spec.platforms(),
        }
    }
}

/// One platform's locked packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLock {
    pub content_hash: String,
    #[serde(default)]
    pub packages: Vec<LockedPackage>,
}

/// A multi-platform lockfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockfile {
    pub version: u32,
    #[serde(default)]
    pub metadata: LockMetadata,
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformLock>,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

impl Lockfile {
    /// An empty lockfile at the current schema version.
    pub fn new(metadata: LockMetadata) -> Self {
        Self {
            version: SCHEMA_VERSION,
            metadata,
            platforms: BTreeMap::new(),
        }
    }

    /// Stored content hash of `platform`, if the platform is locked.
    pub fn content_hash(&self, platform: &str) -> Option<&str> {
        self.platforms
            .get(platform)
            .map(|section| section.content_hash.as_str())
    }

    pub fn platform(&self, platform: &str) -> Option<&PlatformLock> {
        self.platforms.get(platform)
    }

    /// Add or replace a platform section and keep the metadata platform list
    /// in step.
    pub fn insert_platform(&mut self, platform: impl Into<String>, section: PlatformLock) {
        let platform = platform.into();
        if !self.metadata.platforms.contains(&platform) {
            self.metadata.platforms.push(platform.clone());
            self.metadata.platforms.sort();
        }
        self.platforms.insert(platform, section);
    }

    /// Total number of package records across all platforms.
    pub fn package_count(&self) -> usize {
        self.platforms.values().map(|s| s.packages.len()).sum()
    }

    /// Parse a lockfile from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let header: VersionHeader = serde_yaml::from_str(content).map_err(|e| Error::ConfigParse {
            message: format!("Not a lockfile: {}", e),
            hint: Some("lockfiles start with a top-level 'version:' key".to_string()),
        })?;
        if header.version != SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema {
                found: header.version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serialize to YAML text.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Serialization {
            message: e.to_string(),
        })
    }

    /// Read a lockfile from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Read a lockfile if `path` exists.
    pub fn from_file_if_exists(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Self::from_file(path).map(Some)
        } else {
            Ok(None)
        }
    }
}
