#![forbid(unsafe_code)]

//! Red-black tree over paged slot storage.
//!
//! Nodes never hold pointers to each other. Every link is a [`NodeIdx`]
//! into a [`RowStore`], and index 0 is a black sentinel standing in for
//! every missing parent or child. The tree owns its payloads; dropping the
//! tree releases rows, nodes and payloads together.
//!
//! ```
//! use paged_rbtree::tree::RbTree;
//! use paged_rbtree::types::Color;
//!
//! let mut tree = RbTree::new().unwrap();
//! for key in [10, 20, 30] {
//!     tree.insert(key, key.to_string()).unwrap();
//! }
//! let root = tree.node(tree.root());
//! assert_eq!((root.key(), root.color()), (20, Color::Black));
//! assert_eq!(tree.keys().collect::<Vec<_>>(), vec![10, 20, 30]);
//! ```

mod insert;
mod iter;
mod node;
mod rotate;

use std::fmt;

use smallvec::SmallVec;

use crate::primitives::rows::{RowOptions, RowStore, StorageShape};
use crate::types::{Color, NodeIdx, Result};

pub use iter::Iter;
pub use node::NodeRef;
use node::{Node, LEFT, RIGHT};

/// Construction options for [`RbTree`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeOptions {
    /// Slot storage sizing.
    pub storage: RowOptions,
}

impl TreeOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets log2 of the slots per row.
    pub fn row_shift(mut self, shift: u32) -> Self {
        self.storage.row_shift = shift;
        self
    }

    /// Sets the initial row-table capacity.
    pub fn initial_rows(mut self, rows: usize) -> Self {
        self.storage.initial_rows = rows;
        self
    }

    /// Caps the number of rows the tree may allocate.
    pub fn max_rows(mut self, rows: usize) -> Self {
        self.storage.max_rows = Some(rows);
        self
    }
}

/// Insert-only red-black tree keyed by `u64`.
pub struct RbTree<V> {
    slots: RowStore<Node<V>>,
    root: NodeIdx,
}

impl<V> RbTree<V> {
    /// Creates an empty tree with default storage sizing.
    pub fn new() -> Result<Self> {
        Self::with_options(TreeOptions::default())
    }

    /// Creates an empty tree. The first row is allocated eagerly and the
    /// sentinel installed at index 0.
    pub fn with_options(opts: TreeOptions) -> Result<Self> {
        let mut slots = RowStore::new(&opts.storage)?;
        slots.reserve()?;
        let nil = slots.push(Node::sentinel());
        debug_assert_eq!(nil, NodeIdx::NIL.0);
        Ok(Self {
            slots,
            root: NodeIdx::NIL,
        })
    }

    #[inline]
    pub(crate) fn n(&self, idx: NodeIdx) -> &Node<V> {
        &self.slots[idx.0]
    }

    #[inline]
    pub(crate) fn n_mut(&mut self, idx: NodeIdx) -> &mut Node<V> {
        &mut self.slots[idx.0]
    }

    /// Root index; `NIL` while the tree is empty.
    #[inline]
    pub fn root(&self) -> NodeIdx {
        self.root
    }

    /// Index of the sentinel.
    #[inline]
    pub fn sentinel(&self) -> NodeIdx {
        NodeIdx::NIL
    }

    /// Number of inserted nodes, sentinel excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    /// True when nothing has been inserted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// Occupied slots, sentinel included.
    #[inline]
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Row layout of the backing storage.
    pub fn storage_shape(&self) -> StorageShape {
        self.slots.shape()
    }

    /// View of the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` was never issued by this tree.
    pub fn node(&self, idx: NodeIdx) -> NodeRef<'_, V> {
        NodeRef {
            idx,
            node: self.n(idx),
        }
    }

    /// View of the node at `idx`, or `None` if the index was never issued.
    pub fn get_node(&self, idx: NodeIdx) -> Option<NodeRef<'_, V>> {
        self.slots.get(idx.0).map(|node| NodeRef { idx, node })
    }

    /// In-order iterator; duplicate keys come out in insertion order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().map(|n| n.key())
    }

    /// Earliest-inserted node carrying `key`.
    pub fn find(&self, key: u64) -> Option<NodeIdx> {
        let mut found = None;
        let mut cursor = self.root;
        while !cursor.is_nil() {
            let node = self.n(cursor);
            if key < node.key {
                cursor = node.children[LEFT];
            } else if key > node.key {
                cursor = node.children[RIGHT];
            } else {
                // Equal keys sit in insertion order; keep looking left.
                found = Some(cursor);
                cursor = node.children[LEFT];
            }
        }
        found
    }

    /// Payload of the earliest-inserted node carrying `key`.
    pub fn get(&self, key: u64) -> Option<&V> {
        self.find(key).and_then(|idx| self.n(idx).payload.as_ref())
    }

    /// Nodes on the longest root-to-leaf path; 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack: SmallVec<[(NodeIdx, usize); 64]> = SmallVec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }
        while let Some((idx, depth)) = stack.pop() {
            best = best.max(depth);
            for child in self.n(idx).children {
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }
        best
    }

    /// Black nodes on the leftmost root-to-leaf path.
    ///
    /// Only meaningful while the tree is balanced; `admin::verify` checks
    /// that every path agrees.
    pub fn black_height(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.root;
        while !cursor.is_nil() {
            let node = self.n(cursor);
            if node.color == Color::Black {
                count += 1;
            }
            cursor = node.children[LEFT];
        }
        count
    }

    /// Consumes the tree, returning payloads in slot-index order.
    pub fn into_payloads(self) -> Vec<V> {
        self.slots
            .into_values()
            .filter_map(|node| node.payload)
            .collect()
    }
}

impl<V> fmt::Debug for RbTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbTree")
            .field("len", &self.len())
            .field("root", &self.root)
            .field("rows", &self.slots.rows())
            .field("row_width", &self.slots.row_width())
            .finish()
    }
}
