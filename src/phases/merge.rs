//! Phase 1: Graph Merging
//!
//! This is the first phase of the lock pipeline. It folds the package lists
//! returned by every resolver for one platform into a single
//! [`PlatformGraph`].
//!
//! ## Process
//!
//! 1.  **Tagging**: Each node is checked against the platform being merged and
//!     tagged with the manager of the output it arrived in.
//!
//! 2.  **Metadata Check**: Incomplete metadata (missing URL or checksum) is
//!     logged, or rejected when `strict_metadata` is on.
//!
//! 3.  **Uniqueness**: A manager may report each canonical name once per
//!     platform; a second report is a `DuplicatePackage` error.
//!
//! 4.  **Candidate Policy**: When both managers provide the same canonical
//!     name, the configured [`CandidatePolicy`] decides which candidates stay.
//!
//! 5.  **Referential Integrity**: Every dependency edge must resolve to a node
//!     or be a virtual marker. All offending edges are reported together.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::config::{CandidatePolicy, LockConfig};
use crate::error::{Error, Result};
use crate::graph::PlatformGraph;
use crate::input::ResolverOutput;
use crate::metadata::validate_metadata;
use crate::names::NameIndex;
use crate::package::{LockedPackage, Manager, PackageNode};

/// Execute Phase 1: merge and check referential integrity.
pub fn execute(
    platform: &str,
    outputs: &[ResolverOutput],
    config: &LockConfig,
) -> Result<PlatformGraph> {
    let graph = merge_unchecked(platform, outputs, config)?;
    check_integrity(&graph, config)?;
    debug!(
        "{}: merged {} package(s) from {} resolver output(s)",
        platform,
        graph.len(),
        outputs.len()
    );
    Ok(graph)
}

/// Merge without the referential-integrity check.
///
/// Used by the update reconciler, which only checks integrity after stale
/// packages have been pruned.
pub fn merge_unchecked(
    platform: &str,
    outputs: &[ResolverOutput],
    config: &LockConfig,
) -> Result<PlatformGraph> {
    let mut index = NameIndex::new();
    let mut seen: HashSet<(Manager, String)> = HashSet::new();
    let mut candidates: BTreeMap<String, Vec<PackageNode>> = BTreeMap::new();

    for output in outputs {
        for node in &output.packages {
            let node = tag_node(platform, output.manager, node)?;
            check_metadata(platform, &node, config)?;

            let key = index.canonical(&node.name).to_string();
            if !seen.insert((node.manager, key.clone())) {
                return Err(Error::DuplicatePackage {
                    platform: platform.to_string(),
                    manager: node.manager.to_string(),
                    name: node.name,
                });
            }
            candidates.entry(key).or_default().push(node);
        }
    }

    let mut graph = PlatformGraph::new(platform);
    for (key, nodes) in candidates {
        for node in apply_policy(&key, nodes, config.candidate_policy) {
            graph.insert(&mut index, LockedPackage::unlabelled(node));
        }
    }
    Ok(graph)
}

/// Fail with every dangling, non-virtual edge in `graph`.
pub fn check_integrity(graph: &PlatformGraph, config: &LockConfig) -> Result<()> {
    let missing = graph.missing_edges(&mut NameIndex::new(), &config.virtual_prefix);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::ReferentialIntegrity {
            platform: graph.platform().to_string(),
            missing,
        })
    }
}

fn tag_node(platform: &str, manager: Manager, node: &PackageNode) -> Result<PackageNode> {
    if node.platform != platform {
        return Err(Error::PlatformMismatch {
            package: node.name.clone(),
            expected: platform.to_string(),
            found: node.platform.clone(),
        });
    }
    let mut node = node.clone();
    if node.manager != manager {
        warn!(
            "{}: '{}' is tagged {} but was reported by the {} resolver; treating it as {}",
            platform, node.name, node.manager, manager, manager
        );
        node.manager = manager;
    }
    Ok(node)
}

fn check_metadata(platform: &str, node: &PackageNode, config: &LockConfig) -> Result<()> {
    let issues = validate_metadata(node);
    if issues.is_empty() {
        return Ok(());
    }
    let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
    if config.strict_metadata {
        return Err(Error::IncompleteMetadata {
            platform: platform.to_string(),
            package: node.name.clone(),
            issues,
        });
    }
    warn!(
        "{}: incomplete metadata for '{}': {}",
        platform,
        node.name,
        issues.join(", ")
    );
    Ok(())
}

fn apply_policy(key: &str, nodes: Vec<PackageNode>, policy: CandidatePolicy) -> Vec<PackageNode> {
    let preferred = match policy {
        CandidatePolicy::KeepAll => return nodes,
        CandidatePolicy::PreferSystem => Manager::System,
        CandidatePolicy::PreferLanguage => Manager::Language,
    };
    if nodes.len() < 2 || !nodes.iter().any(|n| n.manager == preferred) {
        return nodes;
    }
    let (kept, dropped): (Vec<_>, Vec<_>) =
        nodes.into_iter().partition(|n| n.manager == preferred);
    for node in &dropped {
        debug!(
            "'{}': keeping the {} candidate, dropping {} {} from {}",
            key, preferred, node.name, node.version, node.manager
        );
    }
    kept
}
