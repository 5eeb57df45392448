//! # lockweave
//!
//! Assembles one multi-platform lockfile from the outputs of independent
//! package resolvers. A system package manager and a language package manager
//! each resolve their part of an environment; lockweave merges their answers
//! per platform, labels every package with the dependency groups
//! ("categories") that require it, and writes a deterministic, validated
//! lockfile.
//!
//! ## Quick Example
//!
//! ```
//! use lockweave::config::LockConfig;
//! use lockweave::input;
//! use lockweave::phases::{orchestrator, LockMode};
//!
//! let document = input::parse(r#"
//! spec:
//!   dependencies:
//!     linux-64:
//!       - {name: numpy}
//! resolved:
//!   linux-64:
//!     - manager: system
//!       packages:
//!         - {name: numpy, version: "2.0.1", manager: system, platform: linux-64,
//!            dependencies: {python: "*"}}
//!         - {name: python, version: "3.12.4", manager: system, platform: linux-64}
//! "#).unwrap();
//!
//! let platforms = document.spec.platforms();
//! let lockfile = orchestrator::execute(
//!     &document,
//!     &LockConfig::default(),
//!     LockMode::Fresh,
//!     &platforms,
//!     None,
//! )
//! .unwrap();
//! assert_eq!(lockfile.package_count(), 2);
//! ```
//!
//! ## Core Concepts
//!
//! - **Names (`names`)**: Package names are compared after folding case and
//!   collapsing `-`, `_` and `.` runs, so `typing_extensions` and
//!   `Typing-Extensions` are the same package.
//! - **Graphs (`graph`)**: One [`graph::PlatformGraph`] per platform, keyed by
//!   canonical name. A name may hold a system and a language candidate.
//! - **Specifications (`spec`, `input`)**: What the user asked for, plus the
//!   resolver outputs for each platform.
//! - **Hashing (`hash`)**: A content hash per platform decides whether a
//!   platform needs relocking.
//! - **Lockfiles (`lockfile`)**: The persisted, versioned YAML document.
//! - **Phases (`phases`)**: Merge, propagate (or reconcile for updates),
//!   validate and write.
//!
//! ## Execution Flow
//!
//! The entry point is [`phases::orchestrator::execute`], which for every
//! platform in parallel:
//!
//! 1.  **Merge**: folds resolver outputs into one graph and checks every edge.
//! 2.  **Propagate**: labels packages with the categories of the roots that
//!     reach them, then truncates sets containing the unconditional category.
//! 3.  **Validate**: refuses any section a consumer could not install from.
//!
//! Writing the result is a separate step, [`phases::write::execute`].

pub mod config;
pub mod defaults;
pub mod error;
pub mod graph;
pub mod hash;
pub mod input;
pub mod lockfile;
pub mod metadata;
pub mod names;
pub mod output;
pub mod package;
pub mod phases;
pub mod spec;

#[cfg(test)]
mod propagation_proptest;
