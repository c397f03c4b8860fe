use std::fmt;

use crate::types::{Color, NodeIdx};

pub(crate) const LEFT: usize = 0;
pub(crate) const RIGHT: usize = 1;

/// Child slot a key descends into. Ties go right.
#[inline]
pub(crate) fn side_for(key: u64, node_key: u64) -> usize {
    if key < node_key {
        LEFT
    } else {
        RIGHT
    }
}

/// Stored node record. Links are slot indices; `NodeIdx::NIL` means none.
pub(crate) struct Node<V> {
    pub(crate) color: Color,
    pub(crate) key: u64,
    pub(crate) payload: Option<V>,
    pub(crate) parent: NodeIdx,
    pub(crate) children: [NodeIdx; 2],
}

impl<V> Node<V> {
    pub(crate) fn sentinel() -> Self {
        Self {
            color: Color::Black,
            key: 0,
            payload: None,
            parent: NodeIdx::NIL,
            children: [NodeIdx::NIL; 2],
        }
    }

    /// Fresh red leaf hanging under `parent`.
    pub(crate) fn leaf(key: u64, payload: V, parent: NodeIdx) -> Self {
        Self {
            color: Color::Red,
            key,
            payload: Some(payload),
            parent,
            children: [NodeIdx::NIL; 2],
        }
    }
}

/// Read-only view of one slot.
///
/// This is all an external walker gets: color, key, payload and the three
/// links, plus a sentinel test. Links can be fed back to
/// [`RbTree::node`](crate::tree::RbTree::node).
pub struct NodeRef<'a, V> {
    pub(crate) idx: NodeIdx,
    pub(crate) node: &'a Node<V>,
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V> NodeRef<'a, V> {
    /// Slot index of this node.
    #[inline]
    pub fn idx(&self) -> NodeIdx {
        self.idx
    }

    /// True for the shared sentinel at index 0.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.idx.is_nil()
    }

    /// Node color.
    #[inline]
    pub fn color(&self) -> Color {
        self.node.color
    }

    /// Ordering key. Meaningless for the sentinel.
    #[inline]
    pub fn key(&self) -> u64 {
        self.node.key
    }

    /// Payload; `None` only for the sentinel.
    #[inline]
    pub fn payload(&self) -> Option<&'a V> {
        self.node.payload.as_ref()
    }

    /// Parent index, `NIL` at the root.
    #[inline]
    pub fn parent(&self) -> NodeIdx {
        self.node.parent
    }

    /// Left child index.
    #[inline]
    pub fn left(&self) -> NodeIdx {
        self.node.children[LEFT]
    }

    /// Right child index.
    #[inline]
    pub fn right(&self) -> NodeIdx {
        self.node.children[RIGHT]
    }

    /// `[left, right]`.
    #[inline]
    pub fn children(&self) -> [NodeIdx; 2] {
        self.node.children
    }
}

impl<V> fmt::Debug for NodeRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return f.write_str("Sentinel");
        }
        f.debug_struct("Node")
            .field("idx", &self.idx)
            .field("color", &self.node.color)
            .field("key", &self.node.key)
            .field("parent", &self.node.parent)
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}
