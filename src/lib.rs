//! Insert-only red-black tree whose nodes live in paged slot storage and
//! link to each other by index.

#![warn(missing_docs)]

pub mod admin;
pub mod cli;
pub mod export;
pub mod keys;
pub mod primitives;
pub mod tree;
pub mod types;
