//! # Resolution Documents
//!
//! lockweave never runs a solver. The resolvers are driven by the caller, and
//! their answers are handed over in a resolution document together with the
//! normalized environment specification they were asked to solve:
//!
//! ```yaml
//! spec:
//!   channels: [conda-forge]
//!   dependencies:
//!     linux-64:
//!       - name: jupyter
//! resolved:
//!   linux-64:
//!     - manager: system
//!       packages:
//!         - name: jupyter
//!           version: 1.0.0
//!           manager: system
//!           platform: linux-64
//!           dependencies: {ipython: "*"}
//! ```
//!
//! Both YAML and JSON are accepted (JSON is valid YAML).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::package::{Manager, PackageNode};
use crate::spec::LockSpecification;

/// Everything one resolver returned for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOutput {
    pub manager: Manager,
    #[serde(default)]
    pub packages: Vec<PackageNode>,
}

impl ResolverOutput {
    pub fn new(manager: Manager, packages: Vec<PackageNode>) -> Self {
        Self { manager, packages }
    }
}

/// A specification plus the resolver outputs for each of its platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionDocument {
    pub spec: LockSpecification,
    #[serde(default)]
    pub resolved: BTreeMap<String, Vec<ResolverOutput>>,
}

impl ResolutionDocument {
    /// Resolver outputs of one platform; a platform with no entry has none.
    pub fn outputs_for(&self, platform: &str) -> &[ResolverOutput] {
        self.resolved
            .get(platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn check_platforms(&self) -> Result<()> {
        let known = self.spec.platforms();
        if let Some(extra) = self.resolved.keys().find(|p| !known.contains(p)) {
            return Err(Error::ConfigParse {
                message: format!("Resolver output given for undeclared platform '{}'", extra),
                hint: Some(format!("declared platforms: {}", known.join(", "))),
            });
        }
        Ok(())
    }
}

/// Parse a resolution document.
pub fn parse(content: &str) -> Result<ResolutionDocument> {
    let document: ResolutionDocument =
        serde_yaml::from_str(content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some("a resolution document has top-level 'spec' and 'resolved' keys".to_string()),
        })?;
    document.check_platforms()?;
    Ok(document)
}

/// Read a resolution document from disk.
pub fn from_file(path: &Path) -> Result<ResolutionDocument> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}
