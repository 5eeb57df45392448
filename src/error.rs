//! # Error Handling
//!
//! This module defines the centralized error type for `lockweave`. It uses
//! `thiserror` to build a single `Error` enum covering every failure mode of the
//! lock pipeline, so each phase can propagate with `?` and the binary can render
//! a readable message at the top level.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The three graph errors carry the platform and
//!   every offending name so a user sees the whole picture in one run:
//!   - `ReferentialIntegrity`: a dependency edge points at nothing.
//!   - `MissingRootDependency`: a requested root is absent from the graph.
//!   - `InconsistentLockfile`: final validation rejected the graph.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Graph errors are never downgraded to warnings. Per-platform failures are
//! collected by the orchestrator into `LockRunFailed`.

use std::fmt;

use thiserror::Error;

/// A dependency edge whose target could not be found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MissingEdge {
    /// The package declaring the dependency.
    pub package: String,
    /// The dependency name as spelled by the package.
    pub dependency: String,
}

impl MissingEdge {
    pub fn new(package: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            dependency: dependency.into(),
        }
    }
}

impl fmt::Display for MissingEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.package, self.dependency)
    }
}

/// A single reason a lockfile section failed validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LockfileProblem {
    /// An edge resolves to nothing and is not a virtual marker.
    DanglingEdge(MissingEdge),
    /// A package that must be installable under some category has none.
    EmptyCategories { package: String },
    /// A package record is filed under the wrong platform section.
    WrongPlatform { package: String, platform: String },
    /// Two packages from the same manager normalize to the same name.
    DuplicateName { package: String, manager: String },
}

impl fmt::Display for LockfileProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingEdge(edge) => write!(f, "dangling dependency {}", edge),
            Self::EmptyCategories { package } => {
                write!(f, "package '{}' has no categories", package)
            }
            Self::WrongPlatform { package, platform } => {
                write!(f, "package '{}' is tagged for platform '{}'", package, platform)
            }
            Self::DuplicateName { package, manager } => {
                write!(f, "package '{}' appears twice for manager {}", package, manager)
            }
        }
    }
}

/// One platform's failure inside a multi-platform lock run.
#[derive(Debug)]
pub struct PlatformFailure {
    pub platform: String,
    pub error: Box<Error>,
}

impl fmt::Display for PlatformFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.platform, self.error)
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Main error type for lockweave operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more dependency edges point at packages that are neither in the
    /// merged graph nor virtual markers.
    #[error("Referential integrity error on {platform}: {}", join(.missing, ", "))]
    ReferentialIntegrity {
        platform: String,
        missing: Vec<MissingEdge>,
    },

    /// A root requested by the environment specification is absent from the
    /// resolved graph.
    #[error("Missing root dependency on {platform}: {}", .roots.join(", "))]
    MissingRootDependency { platform: String, roots: Vec<String> },

    /// Final validation rejected a platform section; nothing was written.
    #[error("Inconsistent lockfile for {platform}: {}", join(.problems, "; "))]
    InconsistentLockfile {
        platform: String,
        problems: Vec<LockfileProblem>,
    },

    /// A resolver reported the same logical package twice.
    #[error("Duplicate package '{name}' from {manager} manager on {platform}")]
    DuplicatePackage {
        platform: String,
        manager: String,
        name: String,
    },

    /// A resolver output was handed to the wrong platform.
    #[error("Package '{package}' is tagged for {found} but was merged into {expected}")]
    PlatformMismatch {
        package: String,
        expected: String,
        found: String,
    },

    /// A root request could not be constructed.
    #[error("Invalid root request '{name}': {message}")]
    InvalidRootRequest { name: String, message: String },

    /// A platform was named that the input does not describe.
    #[error("Unknown platform: {platform}")]
    UnknownPlatform { platform: String },

    /// The lockfile was written by an incompatible schema.
    #[error("Unsupported lockfile schema version {found} (supported: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// Package metadata is incomplete and strict metadata checking is on.
    #[error("Incomplete metadata for '{package}' on {platform}: {}", .issues.join(", "))]
    IncompleteMetadata {
        platform: String,
        package: String,
        issues: Vec<String>,
    },

    /// An error occurred while parsing a configuration or input document.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the input
        hint: Option<String>,
    },

    /// At least one platform failed; the others may have succeeded but nothing
    /// was persisted.
    #[error("Lock run failed for {} platform(s):\n  {}", .failures.len(), join(.failures, "\n  "))]
    LockRunFailed { failures: Vec<PlatformFailure> },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// The platform this error is attributed to, when it has one.
    pub fn platform(&self) -> Option<&str> {
        match self {
            Self::ReferentialIntegrity { platform, .. }
            | Self::MissingRootDependency { platform, .. }
            | Self::InconsistentLockfile { platform, .. }
            | Self::DuplicatePackage { platform, .. }
            | Self::IncompleteMetadata { platform, .. }
            | Self::UnknownPlatform { platform } => Some(platform.as_str()),
            Self::PlatformMismatch { expected, .. } => Some(expected.as_str()),
            _ => None,
        }
    }

    /// Names of the packages this error is about, for user-facing reporting.
    ///
    /// For dangling edges both the declaring package and the missing
    /// dependency are listed.
    pub fn offending_names(&self) -> Vec<&str> {
        match self {
            Self::ReferentialIntegrity { missing, .. } => missing
                .iter()
                .flat_map(|e| [e.package.as_str(), e.dependency.as_str()])
                .collect(),
            Self::MissingRootDependency { roots, .. } => {
                roots.iter().map(String::as_str).collect()
            }
            Self::InconsistentLockfile { problems, .. } => problems
                .iter()
                .flat_map(|p| match p {
                    LockfileProblem::DanglingEdge(e) => {
                        vec![e.package.as_str(), e.dependency.as_str()]
                    }
                    LockfileProblem::EmptyCategories { package }
                    | LockfileProblem::WrongPlatform { package, .. }
                    | LockfileProblem::DuplicateName { package, .. } => vec![package.as_str()],
                })
                .collect(),
            Self::DuplicatePackage { name, .. } => vec![name.as_str()],
            Self::PlatformMismatch { package, .. } | Self::IncompleteMetadata { package, .. } => {
                vec![package.as_str()]
            }
            Self::InvalidRootRequest { name, .. } => vec![name.as_str()],
            _ => Vec::new(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
