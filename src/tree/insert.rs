use tracing::trace;

use super::node::{side_for, Node, LEFT, RIGHT};
use super::RbTree;
use crate::types::{Color, NodeIdx, Result};

impl<V> RbTree<V> {
    /// Inserts `key` with `payload` and returns the slot index it landed in.
    ///
    /// Duplicate keys are kept; a later duplicate lands to the right of the
    /// earlier ones. Storage is grown before any link is touched, so on
    /// error the tree is exactly as it was.
    pub fn insert(&mut self, key: u64, payload: V) -> Result<NodeIdx> {
        self.slots.reserve()?;

        let mut parent = NodeIdx::NIL;
        let mut cursor = self.root;
        let mut depth = 0usize;
        while !cursor.is_nil() {
            parent = cursor;
            let node = self.n(cursor);
            cursor = node.children[side_for(key, node.key)];
            depth += 1;
        }

        let u = NodeIdx(self.slots.push(Node::leaf(key, payload, parent)));
        if parent.is_nil() {
            self.root = u;
        } else {
            let side = side_for(key, self.n(parent).key);
            self.n_mut(parent).children[side] = u;
        }

        self.insert_fixup(u);
        trace!(key, index = u.0, depth, "tree.insert");
        Ok(u)
    }

    /// Clears the red-red edge a fresh red leaf at `u` may have introduced.
    fn insert_fixup(&mut self, mut u: NodeIdx) {
        loop {
            let parent = self.n(u).parent;
            if !self.n(parent).color.is_red() {
                break;
            }
            // A red parent is never the root, so the grandparent is real.
            let grand = self.n(parent).parent;
            let side = if self.n(grand).children[LEFT] == parent {
                LEFT
            } else {
                RIGHT
            };
            let uncle = self.n(grand).children[1 - side];

            if self.n(uncle).color.is_red() {
                self.n_mut(parent).color = Color::Black;
                self.n_mut(uncle).color = Color::Black;
                self.n_mut(grand).color = Color::Red;
                u = grand;
                continue;
            }

            if self.n(parent).children[1 - side] == u {
                u = parent;
                if side == LEFT {
                    self.rotate_left(u);
                } else {
                    self.rotate_right(u);
                }
            }
            let parent = self.n(u).parent;
            let grand = self.n(parent).parent;
            self.n_mut(parent).color = Color::Black;
            self.n_mut(grand).color = Color::Red;
            if side == LEFT {
                self.rotate_right(grand);
            } else {
                self.rotate_left(grand);
            }
        }

        let root = self.root;
        self.n_mut(root).color = Color::Black;
        debug_assert_eq!(self.n(NodeIdx::NIL).color, Color::Black);
    }
}
