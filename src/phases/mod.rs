//! The lock pipeline.
//!
//! ## Overview
//!
//! Each platform goes through the same phases, independently of the others:
//! 1. Merge - Fold all resolver outputs into one graph and check its edges
//! 2. Propagate - Label every package with the categories of the roots reaching it
//!    (2b. Reconcile - for updates, lay re-resolved packages over the previous lock
//!    and run propagation over the result)
//! 3. Validate - Check the finished section before anything is persisted
//! 4. Write - Atomically replace the lockfile on disk
//!
//! The [`orchestrator`] runs phases 1-3 for every platform in parallel and
//! assembles the lockfile; phase 4 is left to the caller.

pub mod merge;
pub mod orchestrator;
pub mod propagate;
pub mod reconcile;
pub mod validate;
pub mod write;

pub use merge as phase1;
pub use propagate as phase2;
pub use validate as phase3;
pub use write as phase4;

pub use orchestrator::{lock_platform, plan_platforms, LockMode};
