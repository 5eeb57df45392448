//! # Platform Graph
//!
//! The merged, per-platform node table. Packages are keyed by their
//! [canonical name](crate::names::normalize); a key holds more than one
//! candidate when both managers provide the same logical package and the merge
//! policy kept both.
//!
//! Dependency edges are stored on each package exactly as the resolver spelled
//! them and resolved through [`PlatformGraph::resolve_key`] at use time.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::MissingEdge;
use crate::names::{is_virtual, separator_variants, NameIndex};
use crate::package::LockedPackage;

/// All packages of one platform, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformGraph {
    platform: String,
    nodes: BTreeMap<String, Vec<LockedPackage>>,
    /// Manager-local spelling to canonical key, for exact-spelling hits.
    spellings: HashMap<String, String>,
}

impl PlatformGraph {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            nodes: BTreeMap::new(),
            spellings: HashMap::new(),
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Add a package under its canonical name. Does not check for duplicates;
    /// the merge phase owns that decision.
    pub fn insert(&mut self, index: &mut NameIndex, package: LockedPackage) {
        let key = index.canonical(package.name()).to_string();
        self.spellings
            .insert(package.name().to_string(), key.clone());
        self.nodes.entry(key).or_default().push(package);
    }

    /// Candidates stored under a canonical key.
    pub fn get(&self, key: &str) -> Option<&[LockedPackage]> {
        self.nodes.get(key).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Vec<LockedPackage>> {
        self.nodes.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Canonical keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    /// Every package, grouped by canonical key in sorted order.
    pub fn packages(&self) -> impl Iterator<Item = &LockedPackage> {
        self.nodes.values().flatten()
    }

    pub fn packages_mut(&mut self) -> impl Iterator<Item = &mut LockedPackage> {
        self.nodes.values_mut().flatten()
    }

    /// Total number of packages (not keys).
    pub fn len(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the canonical key `name` refers to.
    ///
    /// Tries every separator spelling of `name` against the names the
    /// resolvers actually used, then the canonical form. A hit is only
    /// accepted when it normalizes to the same name as the query.
    pub fn resolve_key(&self, index: &mut NameIndex, name: &str) -> Option<String> {
        let canonical = index.canonical(name).to_string();
        for variant in separator_variants(name) {
            if let Some(key) = self.spellings.get(&variant) {
                if *key == canonical {
                    return Some(canonical);
                }
            }
        }
        self.nodes.contains_key(&canonical).then_some(canonical)
    }

    /// All candidates `name` refers to; empty when nothing matches.
    pub fn lookup(&self, index: &mut NameIndex, name: &str) -> &[LockedPackage] {
        self.resolve_key(index, name)
            .and_then(|key| self.get(&key))
            .unwrap_or(&[])
    }

    /// Every edge that resolves to nothing and is not a virtual marker, in
    /// sorted order. Checks the whole graph rather than stopping at the first.
    pub fn missing_edges(&self, index: &mut NameIndex, virtual_prefix: &str) -> Vec<MissingEdge> {
        let mut missing = BTreeSet::new();
        for package in self.packages() {
            for dependency in package.node.dependencies.keys() {
                if is_virtual(dependency, virtual_prefix) {
                    continue;
                }
                if self.resolve_key(index, dependency).is_none() {
                    missing.insert(MissingEdge::new(package.name(), dependency));
                }
            }
        }
        missing.into_iter().collect()
    }

    /// Keep only the packages for which `keep` returns true. Keys left with
    /// no candidates are removed.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<LockedPackage>
    where
        F: FnMut(&LockedPackage) -> bool,
    {
        let mut removed = Vec::new();
        for candidates in self.nodes.values_mut() {
            let (kept, dropped): (Vec<_>, Vec<_>) =
                candidates.drain(..).partition(|package| keep(package));
            *candidates = kept;
            removed.extend(dropped);
        }
        self.nodes.retain(|_, candidates| !candidates.is_empty());
        let live: BTreeSet<String> = self
            .packages()
            .map(|package| package.name().to_string())
            .collect();
        self.spellings.retain(|spelling, _| live.contains(spelling));
        removed
    }

    /// Clear every category set, keeping versions and metadata.
    pub fn reset_categories(&mut self) {
        for package in self.packages_mut() {
            package.categories.clear();
        }
    }

    /// Consume the graph into lockfile order: by manager, then canonical name.
    pub fn into_packages(self) -> Vec<LockedPackage> {
        let mut packages: Vec<(String, LockedPackage)> = self
            .nodes
            .into_iter()
            .flat_map(|(key, candidates)| {
                candidates
                    .into_iter()
                    .map(move |package| (key.clone(), package))
            })
            .collect();
        packages.sort_by(|(ka, a), (kb, b)| a.manager().cmp(&b.manager()).then_with(|| ka.cmp(kb)));
        packages.into_iter().map(|(_, package)| package).collect()
    }
}
