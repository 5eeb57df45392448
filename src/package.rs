//! # Package Model
//!
//! The node types that flow through the lock pipeline:
//!
//! - **`PackageNode`**: one resolved package on one platform, exactly as a
//!   resolver reported it.
//! - **`LockedPackage`**: a `PackageNode` plus the set of categories
//!   (dependency groups) that require it.
//! - **`RootRequest`**: a user-declared top-level dependency and the groups it
//!   was declared in.
//!
//! Resolver outputs are tagged with a [`Manager`] instead of living in separate
//! graphs, so the merged graph is a single node table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A set of category labels. Ordered so serialization is deterministic.
pub type Categories = BTreeSet<String>;

/// The package manager that resolved a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Manager {
    /// The system-level manager (binary packages, toolchains, libraries).
    #[serde(alias = "conda")]
    System,
    /// The language-level manager (source and wheel distributions).
    #[serde(alias = "pip")]
    Language,
}

impl fmt::Display for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Language => write!(f, "language"),
        }
    }
}

/// Artifact checksums as reported by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageHash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl PackageHash {
    pub fn is_empty(&self) -> bool {
        self.md5.is_none() && self.sha256.is_none()
    }
}

/// Where a package comes from. Carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Download URL of the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "PackageHash::is_empty")]
    pub hash: PackageHash,
    /// Channel or index the artifact was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Build string, for managers that have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

/// One resolved package on one platform from one manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageNode {
    /// Manager-local spelling of the name.
    pub name: String,
    pub version: String,
    pub manager: Manager,
    pub platform: String,
    /// Dependency name to version constraint. Names may use any separator.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(flatten)]
    pub metadata: PackageMetadata,
}

impl PackageNode {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        manager: Manager,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            manager,
            platform: platform.into(),
            dependencies: BTreeMap::new(),
            metadata: PackageMetadata::default(),
        }
    }

    /// Builder-style helper to add a dependency edge.
    pub fn with_dependency(mut self, name: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.dependencies.insert(name.into(), constraint.into());
        self
    }

    /// Builder-style helper to attach metadata.
    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A package as it appears in a lockfile: a node plus its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    #[serde(flatten)]
    pub node: PackageNode,
    /// Groups that require this package. Only ever grows during propagation.
    #[serde(default)]
    pub categories: Categories,
}

impl LockedPackage {
    /// A freshly merged package with no categories yet.
    pub fn unlabelled(node: PackageNode) -> Self {
        Self {
            node,
            categories: Categories::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn manager(&self) -> Manager {
        self.node.manager
    }

    /// Union `categories` into this package. Returns true if anything was new.
    pub fn add_categories(&mut self, categories: &Categories) -> bool {
        let before = self.categories.len();
        self.categories.extend(categories.iter().cloned());
        self.categories.len() != before
    }
}

/// A user-declared top-level dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRequest {
    pub name: String,
    pub categories: Categories,
}

impl RootRequest {
    /// Create a root request. The name and the category set must be non-empty.
    pub fn new<I, S>(name: impl Into<String>, categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let categories: Categories = categories.into_iter().map(Into::into).collect();
        if name.trim().is_empty() {
            return Err(Error::InvalidRootRequest {
                name,
                message: "name is empty".to_string(),
            });
        }
        if categories.is_empty() || categories.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::InvalidRootRequest {
                name,
                message: "at least one non-empty category is required".to_string(),
            });
        }
        Ok(Self { name, categories })
    }
}
