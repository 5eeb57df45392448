//! Orchestrator for complete lock and update runs
//!
//! This module coordinates the phases per platform and runs the platforms in
//! parallel. Platforms are independent: a failure on one never aborts the
//! others, but any failure means no lockfile is produced.

use std::collections::BTreeSet;

use log::{debug, error, info, warn};
use rayon::prelude::*;

use super::{merge, propagate, reconcile, validate};
use crate::config::LockConfig;
use crate::error::{Error, PlatformFailure, Result};
use crate::hash;
use crate::input::ResolutionDocument;
use crate::lockfile::{LockMetadata, Lockfile, PlatformLock};

/// How the graph of each platform is built.
#[derive(Debug, Clone, Copy)]
pub enum LockMode<'a> {
    /// Merge the resolver outputs from scratch.
    Fresh,
    /// Lay the resolver outputs over `previous`, refreshing `targets`.
    Update {
        previous: &'a Lockfile,
        targets: &'a [String],
    },
}

/// Platforms that need locking: all of them when `force` is set or there is
/// no previous lockfile, otherwise those whose content hash changed.
pub fn plan_platforms(
    document: &ResolutionDocument,
    previous: Option<&Lockfile>,
    force: bool,
) -> Result<Vec<String>> {
    match previous {
        Some(lockfile) if !force => hash::stale_platforms(&document.spec, lockfile),
        _ => Ok(document.spec.platforms()),
    }
}

/// Build, categorize and validate one platform section.
pub fn lock_platform(
    document: &ResolutionDocument,
    platform: &str,
    config: &LockConfig,
    mode: LockMode<'_>,
) -> Result<PlatformLock> {
    let roots = document.spec.root_requests(platform)?;
    let content_hash = hash::content_hash_for_platform(&document.spec, platform)?;
    let outputs = document.outputs_for(platform);

    let mut graph = match mode {
        LockMode::Fresh => {
            let mut graph = merge::execute(platform, outputs, config)?;
            propagate::execute(&mut graph, &roots, config)?;
            graph
        }
        LockMode::Update { previous, targets } => {
            reconcile::execute(previous, platform, &roots, outputs, targets, config)?
        }
    };

    if config.prune_unreachable {
        for package in graph.retain(|package| !package.categories.is_empty()) {
            warn!(
                "{}: '{}' is not required by any root, leaving it out of the lock",
                platform,
                package.name()
            );
        }
    }

    validate::execute(&graph, &roots, config)?;

    let section = PlatformLock {
        content_hash,
        packages: graph.into_packages(),
    };
    validate::validate_section(platform, &section, config)?;
    debug!("{}: locked {} package(s)", platform, section.packages.len());
    Ok(section)
}

/// Execute a lock run over `platforms`.
///
/// Sections of `previous` for platforms that are still declared but not
/// re-locked are carried over unchanged.
pub fn execute(
    document: &ResolutionDocument,
    config: &LockConfig,
    mode: LockMode<'_>,
    platforms: &[String],
    previous: Option<&Lockfile>,
) -> Result<Lockfile> {
    for platform in platforms {
        document.spec.dependencies_for(platform)?;
    }

    let results: Vec<(String, Result<PlatformLock>)> = platforms
        .par_iter()
        .map(|platform| {
            let result = lock_platform(document, platform, config, mode);
            (platform.clone(), result)
        })
        .collect();

    let mut sections = Vec::new();
    let mut failures = Vec::new();
    for (platform, result) in results {
        match result {
            Ok(section) => sections.push((platform, section)),
            Err(e) => {
                error!("{}: {}", platform, e);
                failures.push(PlatformFailure {
                    platform,
                    error: Box::new(e),
                });
            }
        }
    }
    if !failures.is_empty() {
        return Err(Error::LockRunFailed { failures });
    }

    let mut lockfile = Lockfile::new(LockMetadata::from_spec(&document.spec));
    let relocked: BTreeSet<&str> = platforms.iter().map(String::as_str).collect();
    if let Some(previous) = previous {
        for platform in document.spec.platforms() {
            if relocked.contains(platform.as_str()) {
                continue;
            }
            if let Some(section) = previous.platform(&platform) {
                debug!("{}: content unchanged, keeping the previous lock", platform);
                lockfile.insert_platform(platform.clone(), section.clone());
            }
        }
    }
    for (platform, section) in sections {
        lockfile.insert_platform(platform, section);
    }

    info!(
        "Locked {} platform(s), {} carried over",
        platforms.len(),
        lockfile.platforms.len().saturating_sub(platforms.len())
    );
    Ok(lockfile)
}
