//! Phase 3: Lockfile Validation
//!
//! The last check before anything is written. A graph or lockfile section is
//! consistent when:
//!
//! - every dependency edge resolves to a package in the section or is a
//!   virtual marker,
//! - every package a root reaches carries at least one category,
//! - every package is tagged with the section's platform,
//! - no manager lists the same canonical name twice.
//!
//! All problems of a section are collected into one `InconsistentLockfile`
//! error instead of stopping at the first.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::config::LockConfig;
use crate::error::{Error, LockfileProblem, PlatformFailure, Result};
use crate::graph::PlatformGraph;
use crate::lockfile::{Lockfile, PlatformLock};
use crate::names::{is_virtual, NameIndex};
use crate::package::{Manager, RootRequest};

/// Validate a graph that is about to be serialized.
pub fn execute(graph: &PlatformGraph, roots: &[RootRequest], config: &LockConfig) -> Result<()> {
    let mut index = NameIndex::new();
    let mut problems: Vec<LockfileProblem> = graph
        .missing_edges(&mut index, &config.virtual_prefix)
        .into_iter()
        .map(LockfileProblem::DanglingEdge)
        .collect();

    for key in reachable_keys(graph, roots, &config.virtual_prefix) {
        for package in graph.get(&key).unwrap_or(&[]) {
            if package.categories.is_empty() {
                problems.push(LockfileProblem::EmptyCategories {
                    package: package.name().to_string(),
                });
            }
        }
    }

    into_result(graph.platform(), problems)
}

/// Canonical keys reachable from `roots` by following dependency edges.
/// Roots and edges that resolve to nothing are skipped.
pub fn reachable_keys(
    graph: &PlatformGraph,
    roots: &[RootRequest],
    virtual_prefix: &str,
) -> BTreeSet<String> {
    let mut index = NameIndex::new();
    let mut reached = BTreeSet::new();
    let mut queue: VecDeque<String> = roots
        .iter()
        .filter_map(|root| graph.resolve_key(&mut index, &root.name))
        .collect();

    while let Some(key) = queue.pop_front() {
        if !reached.insert(key.clone()) {
            continue;
        }
        for package in graph.get(&key).unwrap_or(&[]) {
            for dependency in package.node.dependencies.keys() {
                if is_virtual(dependency, virtual_prefix) {
                    continue;
                }
                if let Some(next) = graph.resolve_key(&mut index, dependency) {
                    if !reached.contains(&next) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }
    reached
}

/// Every problem of a stored platform section.
///
/// A stored section has no roots attached, so every package in it must carry
/// at least one category.
pub fn section_problems(
    platform: &str,
    section: &PlatformLock,
    config: &LockConfig,
) -> Vec<LockfileProblem> {
    let mut problems = Vec::new();
    let mut index = NameIndex::new();
    let mut seen: HashSet<(Manager, String)> = HashSet::new();
    let mut graph = PlatformGraph::new(platform);

    for package in &section.packages {
        if package.node.platform != platform {
            problems.push(LockfileProblem::WrongPlatform {
                package: package.name().to_string(),
                platform: package.node.platform.clone(),
            });
        }
        let key = index.canonical(package.name()).to_string();
        if !seen.insert((package.manager(), key)) {
            problems.push(LockfileProblem::DuplicateName {
                package: package.name().to_string(),
                manager: package.manager().to_string(),
            });
        }
        if package.categories.is_empty() {
            problems.push(LockfileProblem::EmptyCategories {
                package: package.name().to_string(),
            });
        }
        graph.insert(&mut index, package.clone());
    }

    problems.extend(
        graph
            .missing_edges(&mut index, &config.virtual_prefix)
            .into_iter()
            .map(LockfileProblem::DanglingEdge),
    );
    problems.sort();
    problems.dedup();
    problems
}

/// Validate one stored platform section.
pub fn validate_section(platform: &str, section: &PlatformLock, config: &LockConfig) -> Result<()> {
    into_result(platform, section_problems(platform, section, config))
}

/// Validate every section of a lockfile.
///
/// A single failing platform is reported directly; several are bundled into
/// `LockRunFailed`.
pub fn validate_lockfile(lockfile: &Lockfile, config: &LockConfig) -> Result<()> {
    let mut failures: Vec<PlatformFailure> = lockfile
        .platforms
        .iter()
        .filter_map(|(platform, section)| {
            validate_section(platform, section, config)
                .err()
                .map(|error| PlatformFailure {
                    platform: platform.clone(),
                    error: Box::new(error),
                })
        })
        .collect();

    match failures.len() {
        0 => Ok(()),
        1 => Err(*failures.remove(0).error),
        _ => Err(Error::LockRunFailed { failures }),
    }
}

fn into_result(platform: &str, problems: Vec<LockfileProblem>) -> Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::InconsistentLockfile {
            platform: platform.to_string(),
            problems,
        })
    }
}
