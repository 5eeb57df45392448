//! Phase 2b: Update Reconciliation
//!
//! Replaces the merge + propagate steps when only some packages are
//! re-resolved. The previous lock is the starting point; the resolver output
//! for the targeted packages is laid over it.
//!
//! ## Process
//!
//! 1.  **Carry Over**: Every package of the previous platform section is kept
//!     with its version and metadata, but its categories are dropped. Labels
//!     from the old dependency structure must never survive an update.
//!
//! 2.  **Override**: A re-resolved package replaces the previous package with
//!     the same canonical name and manager. A targeted package that the
//!     resolver no longer returns is removed.
//!
//! 3.  **Propagation**: Categories are recomputed from the current roots over
//!     the combined graph, exactly as for a fresh lock.
//!
//! 4.  **Pruning**: Packages that no root reaches any more (for example the
//!     old dependencies of an updated package) are dropped.
//!
//! 5.  **Integrity**: The pruned graph must be referentially intact.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::config::LockConfig;
use crate::error::Result;
use crate::graph::PlatformGraph;
use crate::input::ResolverOutput;
use crate::lockfile::Lockfile;
use crate::names::normalize;
use crate::package::{Manager, PackageNode, RootRequest};

use super::{merge, propagate};

/// Execute the reconciler for one platform.
///
/// `targets` are the package names the caller asked to update, in any
/// spelling. Returns the pruned graph with categories populated.
pub fn execute(
    previous: &Lockfile,
    platform: &str,
    roots: &[RootRequest],
    re_resolved: &[ResolverOutput],
    targets: &[String],
    config: &LockConfig,
) -> Result<PlatformGraph> {
    for target in unmatched_targets(previous, platform, re_resolved, targets) {
        warn!(
            "{}: '{}' is neither locked nor re-resolved, nothing to update",
            platform, target
        );
    }

    let targets: BTreeSet<String> = targets.iter().map(|t| normalize(t)).collect();
    let outputs = overlay(previous, platform, re_resolved, &targets);

    let mut graph = merge::merge_unchecked(platform, &outputs, config)?;
    propagate::execute(&mut graph, roots, config)?;

    let stale = graph.retain(|package| !package.categories.is_empty());
    for package in &stale {
        info!(
            "{}: dropping {} {} ({}), no longer required",
            platform,
            package.name(),
            package.node.version,
            package.manager()
        );
    }

    merge::check_integrity(&graph, config)?;
    Ok(graph)
}

/// Targets that name no package of the previous section and none of the
/// re-resolved packages, in their original spelling.
fn unmatched_targets<'a>(
    previous: &Lockfile,
    platform: &str,
    re_resolved: &[ResolverOutput],
    targets: &'a [String],
) -> Vec<&'a str> {
    let mut known: BTreeSet<String> = re_resolved
        .iter()
        .flat_map(|output| output.packages.iter().map(|node| normalize(&node.name)))
        .collect();
    if let Some(section) = previous.platform(platform) {
        known.extend(section.packages.iter().map(|package| normalize(package.name())));
    }
    targets
        .iter()
        .filter(|target| !known.contains(&normalize(target)))
        .map(String::as_str)
        .collect()
}

/// Lay the re-resolved packages over the previous lock, grouped per manager.
fn overlay(
    previous: &Lockfile,
    platform: &str,
    re_resolved: &[ResolverOutput],
    targets: &BTreeSet<String>,
) -> Vec<ResolverOutput> {
    let fresh: BTreeSet<(Manager, String)> = re_resolved
        .iter()
        .flat_map(|output| {
            output
                .packages
                .iter()
                .map(move |node| (output.manager, normalize(&node.name)))
        })
        .collect();

    let mut by_manager: BTreeMap<Manager, Vec<PackageNode>> = BTreeMap::new();

    match previous.platform(platform) {
        Some(section) => {
            for package in &section.packages {
                let key = normalize(package.name());
                if fresh.contains(&(package.manager(), key.clone())) {
                    continue;
                }
                if targets.contains(&key) {
                    debug!("{}: '{}' was not re-resolved, removing it", platform, package.name());
                    continue;
                }
                by_manager
                    .entry(package.manager())
                    .or_default()
                    .push(package.node.clone());
            }
        }
        None => info!("{}: no previous lock, reconciling from scratch", platform),
    }

    for output in re_resolved {
        by_manager
            .entry(output.manager)
            .or_default()
            .extend(output.packages.iter().cloned());
    }

    by_manager
        .into_iter()
        .map(|(manager, packages)| ResolverOutput::new(manager, packages))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lockfile::{LockMetadata, PlatformLock};
    use crate::package::LockedPackage;

    fn node(name: &str, version: &str) -> PackageNode {
        PackageNode::new(name, version, Manager::System, "linux-64")
    }

    fn labelled(node: PackageNode, categories: &[&str]) -> LockedPackage {
        let mut package = LockedPackage::unlabelled(node);
        package.categories = categories.iter().map(|c| c.to_string()).collect();
        package
    }

    fn previous(packages: Vec<LockedPackage>) -> Lockfile {
        let mut lockfile = Lockfile::new(LockMetadata::default());
        lockfile.insert_platform(
            "linux-64",
            PlatformLock {
                content_hash: "0".repeat(64),
                packages,
            },
        );
        lockfile
    }

    fn root(name: &str, category: &str) -> RootRequest {
        RootRequest::new(name, [category]).unwrap()
    }

    #[test]
    fn test_update_drops_stale_dependency_and_labels_new_one() {
        let old = previous(vec![
            labelled(node("pydantic", "1.10.0").with_dependency("typing-extensions", "*"), &["main"]),
            labelled(node("typing-extensions", "4.5.0"), &["main"]),
        ]);
        let fresh = vec![ResolverOutput::new(
            Manager::System,
            vec![
                node("pydantic", "2.0.0").with_dependency("pydantic-core", "*"),
                node("pydantic-core", "2.0.0"),
            ],
        )];

        let graph = execute(
            &old,
            "linux-64",
            &[root("pydantic", "main")],
            &fresh,
            &["pydantic".to_string()],
            &LockConfig::default(),
        )
        .unwrap();

        assert!(!graph.contains_key("typing-extensions"));
        assert_eq!(graph.get("pydantic").unwrap()[0].node.version, "2.0.0");
        let core = &graph.get("pydantic-core").unwrap()[0];
        assert!(core.categories.contains("main"));
    }

    #[test]
    fn test_old_categories_are_recomputed() {
        let old = previous(vec![
            labelled(node("pytest", "8.0.0").with_dependency("pluggy", "*"), &["test"]),
            labelled(node("pluggy", "1.4.0"), &["main"]),
        ]);
        let graph = execute(
            &old,
            "linux-64",
            &[root("pytest", "test")],
            &[],
            &[],
            &LockConfig::default(),
        )
        .unwrap();
        let pluggy: Vec<_> = graph.get("pluggy").unwrap()[0].categories.iter().cloned().collect();
        assert_eq!(pluggy, vec!["test"]);
    }

    #[test]
    fn test_targets_match_any_spelling() {
        let old = previous(vec![labelled(node("ruamel.yaml", "0.17.0"), &["main"])]);
        let fresh = vec![ResolverOutput::new(Manager::System, vec![node("ruamel_yaml", "0.18.6")])];
        let graph = execute(
            &old,
            "linux-64",
            &[root("ruamel-yaml", "main")],
            &fresh,
            &["RUAMEL-YAML".to_string()],
            &LockConfig::default(),
        )
        .unwrap();
        let candidates = graph.get("ruamel-yaml").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].node.version, "0.18.6");
    }

    #[test]
    fn test_kept_package_pointing_at_removed_target_fails() {
        let old = previous(vec![
            labelled(node("app", "1.0.0").with_dependency("legacy", "*"), &["main"]),
            labelled(node("legacy", "0.1.0"), &["main"]),
        ]);
        let err = execute(
            &old,
            "linux-64",
            &[root("app", "main")],
            &[],
            &["legacy".to_string()],
            &LockConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity { .. }));
    }

    #[test]
    fn test_missing_previous_section_reconciles_from_resolver_output() {
        let old = Lockfile::new(LockMetadata::default());
        let fresh = vec![ResolverOutput::new(Manager::System, vec![node("zlib", "1.3.1")])];
        let graph = execute(
            &old,
            "linux-64",
            &[root("zlib", "main")],
            &fresh,
            &["zlib".to_string()],
            &LockConfig::default(),
        )
        .unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_unmatched_targets_are_reported() {
        let old = previous(vec![labelled(node("ruamel.yaml", "0.17.0"), &["main"])]);
        let fresh = vec![ResolverOutput::new(Manager::System, vec![node("zlib", "1.3.1")])];
        let targets = vec![
            "Ruamel_Yaml".to_string(),
            "zlib".to_string(),
            "nmupy".to_string(),
        ];
        assert_eq!(
            unmatched_targets(&old, "linux-64", &fresh, &targets),
            vec!["nmupy"]
        );
        assert_eq!(
            unmatched_targets(&old, "osx-arm64", &fresh, &targets),
            vec!["Ruamel_Yaml", "nmupy"]
        );
    }

    #[test]
    fn test_unmatched_target_leaves_lock_unchanged() {
        let old = previous(vec![labelled(node("zlib", "1.3.1"), &["main"])]);
        let graph = execute(
            &old,
            "linux-64",
            &[root("zlib", "main")],
            &[],
            &["zlibb".to_string()],
            &LockConfig::default(),
        )
        .unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get("zlib").unwrap()[0].node.version, "1.3.1");
    }
}
