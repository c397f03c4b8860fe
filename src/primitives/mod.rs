//! Low-level building blocks for the tree.

/// Row-of-pages slot storage.
///
/// Dense integer indices mapped onto fixed-width rows that never move once
/// allocated.
pub mod rows;
