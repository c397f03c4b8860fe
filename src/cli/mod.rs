#![forbid(unsafe_code)]

//! Command-line support shared by the `rbtree` binary.
//!
//! The binary owns argument parsing, configuration and presentation; the
//! pipeline that turns an input stream into a tree lives here so it can be
//! tested without spawning a process.

/// Record loading and DOT export.
pub mod load;

pub use load::{load_from, run_load, CliError, LoadConfig, LoadSummary, PROGRESS_INTERVAL};
