use tracing::trace;

use super::node::{LEFT, RIGHT};
use super::RbTree;
use crate::types::NodeIdx;

impl<V> RbTree<V> {
    /// Lifts `u`'s right child into `u`'s place; `u` becomes its left child.
    pub(crate) fn rotate_left(&mut self, u: NodeIdx) {
        self.rotate(u, LEFT);
    }

    /// Lifts `u`'s left child into `u`'s place; `u` becomes its right child.
    pub(crate) fn rotate_right(&mut self, u: NodeIdx) {
        self.rotate(u, RIGHT);
    }

    /// Rotation moving `u` down towards `down`. The child on the opposite
    /// side takes its place and hands its inner subtree to `u`.
    fn rotate(&mut self, u: NodeIdx, down: usize) {
        let up = 1 - down;
        let v = self.n(u).children[up];
        assert!(
            !u.is_nil() && !v.is_nil(),
            "rotation around {u} needs a non-sentinel child to lift"
        );

        let inner = self.n(v).children[down];
        self.n_mut(u).children[up] = inner;
        if !inner.is_nil() {
            self.n_mut(inner).parent = u;
        }

        let parent = self.n(u).parent;
        self.n_mut(v).parent = parent;
        if parent.is_nil() {
            self.root = v;
        } else if self.n(parent).children[LEFT] == u {
            self.n_mut(parent).children[LEFT] = v;
        } else {
            self.n_mut(parent).children[RIGHT] = v;
        }

        self.n_mut(v).children[down] = u;
        self.n_mut(u).parent = v;
        trace!(
            pivot = u.0,
            lifted = v.0,
            dir = if down == LEFT { "left" } else { "right" },
            "tree.rotate"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::RbTree;
    use crate::types::NodeIdx;

    fn shape(tree: &RbTree<()>) -> Vec<(u64, u64, Option<u64>, Option<u64>)> {
        let key_of = |idx: NodeIdx| (!idx.is_nil()).then(|| tree.node(idx).key());
        tree.iter()
            .map(|n| {
                let parent = key_of(n.parent()).unwrap_or(0);
                (n.key(), parent, key_of(n.left()), key_of(n.right()))
            })
            .collect()
    }

    #[test]
    fn left_then_right_restores_shape() {
        let mut tree = RbTree::new().unwrap();
        for key in [40, 20, 60, 10, 30, 50, 70] {
            tree.insert(key, ()).unwrap();
        }
        let before = shape(&tree);
        let root = tree.root();
        tree.rotate_left(root);
        let lifted = tree.root();
        assert_eq!(tree.node(lifted).key(), 60);
        assert_eq!(tree.node(tree.node(lifted).left()).key(), 40);
        assert_eq!(tree.node(tree.node(root).right()).key(), 50);
        assert_eq!(tree.node(tree.node(root).right()).parent(), root);
        assert!(tree.node(lifted).parent().is_nil());
        tree.rotate_right(lifted);
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn rotation_below_root_relinks_parent() {
        let mut tree = RbTree::new().unwrap();
        for key in [40, 20, 60, 10, 30, 50, 70] {
            tree.insert(key, ()).unwrap();
        }
        let root = tree.root();
        let left = tree.node(root).left();
        tree.rotate_left(left);
        let new_left = tree.node(root).left();
        assert_eq!(tree.node(new_left).key(), 30);
        assert_eq!(tree.node(new_left).parent(), root);
        assert_eq!(tree.node(tree.node(new_left).left()).key(), 20);
        let keys: Vec<u64> = tree.keys().collect();
        assert_eq!(keys, vec![10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    #[should_panic(expected = "needs a non-sentinel child")]
    fn rotating_without_child_panics() {
        let mut tree = RbTree::new().unwrap();
        let idx = tree.insert(1, ()).unwrap();
        tree.rotate_left(idx);
    }
}
