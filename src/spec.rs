//! # Environment Specification
//!
//! The normalized environment specification handed over by the (external)
//! environment-file parser: the user's declared dependencies per platform, the
//! channels and sources they came from, and the solver settings. It is the
//! input to the [content hasher](crate::hash) and the source of each
//! platform's [`RootRequest`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defaults::UNCONDITIONAL_CATEGORY;
use crate::error::{Error, Result};
use crate::names::normalize;
use crate::package::{Categories, Manager, RootRequest};

fn default_manager() -> Manager {
    Manager::System
}

fn default_category() -> String {
    UNCONDITIONAL_CATEGORY.to_string()
}

fn default_true() -> bool {
    true
}

/// One dependency as declared by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDependency {
    pub name: String,
    #[serde(default = "default_manager")]
    pub manager: Manager,
    /// Version constraint as written; `None` means any version.
    #[serde(default)]
    pub version: Option<String>,
    /// The group this declaration belongs to.
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub extras: Vec<String>,
    /// Environment markers, for language-manager dependencies.
    #[serde(default)]
    pub markers: Option<String>,
}

impl SpecDependency {
    pub fn new(name: impl Into<String>, manager: Manager, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manager,
            version: None,
            category: category.into(),
            extras: Vec::new(),
            markers: None,
        }
    }
}

/// The normalized environment specification for all platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockSpecification {
    /// Declared dependencies, keyed by platform.
    pub dependencies: BTreeMap<String, Vec<SpecDependency>>,
    /// Channels in priority order.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Environment files the specification was built from.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Extra indexes for the language manager.
    #[serde(default)]
    pub pip_repositories: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_pypi_requests: bool,
    /// Applied virtual-package repodata, keyed by platform (and `noarch`).
    #[serde(default)]
    pub virtual_packages: BTreeMap<String, serde_json::Value>,
}

impl LockSpecification {
    /// Platforms described by this specification, sorted.
    pub fn platforms(&self) -> Vec<String> {
        self.dependencies.keys().cloned().collect()
    }

    /// Declared dependencies of one platform.
    pub fn dependencies_for(&self, platform: &str) -> Result<&[SpecDependency]> {
        self.dependencies
            .get(platform)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownPlatform {
                platform: platform.to_string(),
            })
    }

    /// Root requests of one platform.
    ///
    /// Declarations that normalize to the same name are folded into one root
    /// carrying the union of their categories; the first spelling wins.
    pub fn root_requests(&self, platform: &str) -> Result<Vec<RootRequest>> {
        let mut roots: BTreeMap<String, (String, Categories)> = BTreeMap::new();
        for dependency in self.dependencies_for(platform)? {
            let (_, categories) = roots
                .entry(normalize(&dependency.name))
                .or_insert_with(|| (dependency.name.clone(), Categories::new()));
            categories.insert(dependency.category.clone());
        }
        roots
            .into_values()
            .map(|(name, categories)| RootRequest::new(name, categories))
            .collect()
    }
}
