#![forbid(unsafe_code)]

//! Inspection utilities for trees.
//!
//! Read-only checks and summaries used by the CLI and by tests. None of
//! these functions mutate the tree.

mod stats;
mod verify;

/// Shape and storage statistics.
pub use stats::{stats, StatsReport, StorageStatsSection, TreeStatsSection};

/// Invariant verification.
///
/// Checks the red-black coloring rules, search order, link symmetry and the
/// logarithmic height bound, and reports every violation it finds.
pub use verify::{
    height_bound, verify, VerifyCounts, VerifyFinding, VerifyLevel, VerifyReport, VerifySeverity,
};
