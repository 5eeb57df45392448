//! # Content Hashing
//!
//! A deterministic SHA-256 fingerprint of the normalized environment
//! specification, computed per platform. The digest is stamped into the
//! lockfile, and comparing it with a freshly computed one tells the caller
//! whether a platform needs to be re-resolved at all.
//!
//! The hashed document is canonical JSON: object keys are sorted (serde_json's
//! default map is ordered), dependencies are sorted by manager then name,
//! extras and sources are sorted. Channel order is kept because it encodes
//! priority.

use std::collections::BTreeMap;

use log::debug;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::lockfile::Lockfile;
use crate::spec::{LockSpecification, SpecDependency};

/// Length of a hex-encoded digest.
pub const DIGEST_LEN: usize = 64;

/// The canonical document hashed for `platform`.
fn canonical_document(spec: &LockSpecification, platform: &str) -> Result<Value> {
    let mut specs: Vec<SpecDependency> = spec.dependencies_for(platform)?.to_vec();
    for dependency in &mut specs {
        dependency.extras.sort();
    }
    specs.sort_by(|a, b| {
        a.manager
            .cmp(&b.manager)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.category.cmp(&b.category))
    });

    let mut sources = spec.sources.clone();
    sources.sort();

    let mut document = json!({
        "channels": spec.channels,
        "sources": sources,
        "specs": serde_json::to_value(&specs)?,
        "solver": {
            "allow_pypi_requests": spec.allow_pypi_requests,
            "pip_repositories": spec.pip_repositories,
        },
    });

    if !spec.virtual_packages.is_empty() {
        let mut virtual_packages = Map::new();
        for key in ["noarch", platform] {
            let repodata = spec
                .virtual_packages
                .get(key)
                .cloned()
                .unwrap_or_else(|| json!({}));
            virtual_packages.insert(key.to_string(), repodata);
        }
        document["virtual_package_hash"] = Value::Object(virtual_packages);
    }

    Ok(document)
}

/// Hash arbitrary bytes to lowercase hex SHA-256.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Content hash of one platform's specification.
pub fn content_hash_for_platform(spec: &LockSpecification, platform: &str) -> Result<String> {
    let document = canonical_document(spec, platform)?;
    let encoded = serde_json::to_string(&document)?;
    Ok(digest(encoded.as_bytes()))
}

/// Content hashes of every platform in the specification.
pub fn content_hashes(spec: &LockSpecification) -> Result<BTreeMap<String, String>> {
    spec.platforms()
        .into_iter()
        .map(|platform| {
            let hash = content_hash_for_platform(spec, &platform)?;
            Ok((platform, hash))
        })
        .collect()
}

/// Platforms whose stored hash is missing from `lockfile` or differs from the
/// specification's current hash.
pub fn stale_platforms(spec: &LockSpecification, lockfile: &Lockfile) -> Result<Vec<String>> {
    let mut stale = Vec::new();
    for (platform, hash) in content_hashes(spec)? {
        match lockfile.content_hash(&platform) {
            Some(stored) if stored == hash => {
                debug!("{}: content hash unchanged ({})", platform, &hash[..12]);
            }
            _ => stale.push(platform),
        }
    }
    Ok(stale)
}
