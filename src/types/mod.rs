#![forbid(unsafe_code)]

//! Shared identifiers and the crate-wide error type.

use std::fmt;

/// Index of a node slot inside the paged storage.
///
/// Index `0` is reserved for the sentinel, so `NodeIdx::NIL` doubles as
/// "no parent" / "no child" / "empty root".
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    /// The sentinel index.
    pub const NIL: NodeIdx = NodeIdx(0);

    /// Returns true when this index names the sentinel.
    #[inline]
    pub fn is_nil(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeIdx {
    fn from(value: u32) -> Self {
        NodeIdx(value)
    }
}

impl From<NodeIdx> for u32 {
    fn from(value: NodeIdx) -> Self {
        value.0
    }
}

/// Node color.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Red node.
    Red,
    /// Black node; the sentinel is always black.
    Black,
}

impl Color {
    /// Returns true for [`Color::Red`].
    #[inline]
    pub fn is_red(self) -> bool {
        matches!(self, Color::Red)
    }
}

/// Errors surfaced by the tree and its storage.
#[derive(thiserror::Error, Debug)]
pub enum RbError {
    /// A new row or a larger row table could not be allocated.
    #[error("out of memory: could not grow storage to {requested_rows} rows")]
    OutOfMemory {
        /// Row count the failed growth step was aiming for.
        requested_rows: usize,
    },
    /// The 32-bit index space is exhausted.
    #[error("capacity exceeded: node index space is exhausted")]
    CapacityExceeded,
    /// Options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
    /// I/O failure while reading records or writing an export.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_is_zero() {
        assert!(NodeIdx::NIL.is_nil());
        assert!(!NodeIdx(7).is_nil());
        assert_eq!(u32::from(NodeIdx(7)), 7);
        assert_eq!(NodeIdx::from(3).to_string(), "3");
    }

    #[test]
    fn error_messages() {
        let err = RbError::OutOfMemory { requested_rows: 4 };
        assert_eq!(
            err.to_string(),
            "out of memory: could not grow storage to 4 rows"
        );
        assert_eq!(
            RbError::InvalidOptions("row_shift out of range").to_string(),
            "invalid options: row_shift out of range"
        );
    }
}
