//! Completeness checks for resolver-supplied package metadata.
//!
//! Resolvers occasionally hand back records with no download URL or no
//! checksum (a known failure mode when a package cache was populated from an
//! explicit lockfile). Such a record can still be merged and categorized, but
//! an installer cannot verify it. The merge phase reports these issues as
//! warnings, or refuses them when strict metadata checking is enabled.

use std::fmt;

use url::Url;

use crate::package::{PackageMetadata, PackageNode};

/// A single problem with a package's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataIssue {
    MissingUrl,
    InvalidUrl(String),
    MissingChecksum,
    EmptyVersion,
}

impl fmt::Display for MetadataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUrl => write!(f, "url is missing"),
            Self::InvalidUrl(reason) => write!(f, "url is invalid ({})", reason),
            Self::MissingChecksum => write!(f, "no md5 or sha256 checksum"),
            Self::EmptyVersion => write!(f, "version is empty"),
        }
    }
}

fn check_url(metadata: &PackageMetadata) -> Option<MetadataIssue> {
    match metadata.url.as_deref() {
        None | Some("") => Some(MetadataIssue::MissingUrl),
        Some(raw) => Url::parse(raw)
            .err()
            .map(|e| MetadataIssue::InvalidUrl(e.to_string())),
    }
}

/// Every metadata problem of `node`, empty when the record is complete.
pub fn validate_metadata(node: &PackageNode) -> Vec<MetadataIssue> {
    let mut issues = Vec::new();
    if node.version.trim().is_empty() {
        issues.push(MetadataIssue::EmptyVersion);
    }
    if let Some(issue) = check_url(&node.metadata) {
        issues.push(issue);
    }
    if node.metadata.hash.is_empty() {
        issues.push(MetadataIssue::MissingChecksum);
    }
    issues
}
