//! Phase 2: Category Propagation
//!
//! Labels every package with the categories (dependency groups) of the roots
//! that reach it.
//!
//! ## Process
//!
//! 1.  **Seeding**: Each root request is resolved through the name normalizer.
//!     A root that cannot be found is a hard failure; every missing root of
//!     the platform is reported in one `MissingRootDependency` error.
//!
//! 2.  **Closure**: A breadth-first worklist of `(package, categories)` pairs.
//!     Popping a pair unions the categories into every candidate under that
//!     name. Only a candidate whose set actually grew pushes its dependencies,
//!     carrying the same categories forward. Sets only grow and are bounded by
//!     the labels in play, so the loop terminates on cyclic graphs without any
//!     cycle detection.
//!
//! 3.  **Truncation**: After convergence, a package carrying the unconditional
//!     category plus anything else is cut back to just the unconditional
//!     category. This is a separate pass so that no intermediate state of the
//!     closure is ever truncated.
//!
//! Dependency edges met during the closure that resolve to nothing (and are
//! not virtual markers) are collected and reported as one
//! `ReferentialIntegrity` error.

use std::collections::{BTreeSet, VecDeque};

use log::debug;

use crate::config::LockConfig;
use crate::error::{Error, MissingEdge, Result};
use crate::graph::PlatformGraph;
use crate::names::{is_virtual, NameIndex};
use crate::package::{Categories, RootRequest};

/// Counters from one propagation run, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Worklist entries processed.
    pub visits: usize,
    /// Packages whose category set was truncated.
    pub truncated: usize,
}

/// Execute Phase 2: closure followed by truncation.
pub fn execute(
    graph: &mut PlatformGraph,
    roots: &[RootRequest],
    config: &LockConfig,
) -> Result<PropagationStats> {
    let mut stats = propagate_closure(graph, roots, &config.virtual_prefix)?;
    stats.truncated = truncate(graph, &config.unconditional_category);
    debug!(
        "{}: propagated {} root(s) in {} visit(s), truncated {} package(s)",
        graph.platform(),
        roots.len(),
        stats.visits,
        stats.truncated
    );
    Ok(stats)
}

/// Run the category closure without truncation.
pub fn propagate_closure(
    graph: &mut PlatformGraph,
    roots: &[RootRequest],
    virtual_prefix: &str,
) -> Result<PropagationStats> {
    let mut index = NameIndex::new();
    let mut queue: VecDeque<(String, Categories)> = VecDeque::new();

    let mut missing_roots = Vec::new();
    for root in roots {
        match graph.resolve_key(&mut index, &root.name) {
            Some(key) => queue.push_back((key, root.categories.clone())),
            None => missing_roots.push(root.name.clone()),
        }
    }
    if !missing_roots.is_empty() {
        return Err(Error::MissingRootDependency {
            platform: graph.platform().to_string(),
            roots: missing_roots,
        });
    }

    let mut stats = PropagationStats::default();
    let mut missing_edges: BTreeSet<MissingEdge> = BTreeSet::new();

    while let Some((key, categories)) = queue.pop_front() {
        stats.visits += 1;

        let mut edges: Vec<(String, String)> = Vec::new();
        if let Some(candidates) = graph.get_mut(&key) {
            for package in candidates.iter_mut() {
                if package.add_categories(&categories) {
                    edges.extend(
                        package
                            .node
                            .dependencies
                            .keys()
                            .map(|dependency| (package.node.name.clone(), dependency.clone())),
                    );
                }
            }
        }

        for (owner, dependency) in edges {
            if is_virtual(&dependency, virtual_prefix) {
                continue;
            }
            match graph.resolve_key(&mut index, &dependency) {
                Some(next) => queue.push_back((next, categories.clone())),
                None => {
                    missing_edges.insert(MissingEdge::new(owner, dependency));
                }
            }
        }
    }

    if !missing_edges.is_empty() {
        return Err(Error::ReferentialIntegrity {
            platform: graph.platform().to_string(),
            missing: missing_edges.into_iter().collect(),
        });
    }
    Ok(stats)
}

/// Cut every set that strictly contains `unconditional` down to just it.
/// Returns how many packages were truncated.
pub fn truncate(graph: &mut PlatformGraph, unconditional: &str) -> usize {
    let mut truncated = 0;
    for package in graph.packages_mut() {
        if package.categories.len() > 1 && package.categories.contains(unconditional) {
            package.categories = Categories::from([unconditional.to_string()]);
            truncated += 1;
        }
    }
    truncated
}
