use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::node::{NodeRef, LEFT, RIGHT};
use super::RbTree;
use crate::types::NodeIdx;

/// In-order walk over the non-sentinel nodes.
///
/// Uses an explicit stack, so walking never recurses regardless of height.
pub struct Iter<'a, V> {
    tree: &'a RbTree<V>,
    stack: SmallVec<[NodeIdx; 64]>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(tree: &'a RbTree<V>) -> Self {
        let mut iter = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len(),
        };
        iter.push_left_spine(tree.root());
        iter
    }

    fn push_left_spine(&mut self, mut idx: NodeIdx) {
        while !idx.is_nil() {
            self.stack.push(idx);
            idx = self.tree.n(idx).children[LEFT];
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = NodeRef<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.tree.n(idx);
        self.push_left_spine(node.children[RIGHT]);
        self.remaining -= 1;
        Some(NodeRef { idx, node })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a RbTree<V> {
    type Item = NodeRef<'a, V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::RbTree;

    #[test]
    fn empty_tree_yields_nothing() {
        let tree: RbTree<()> = RbTree::new().unwrap();
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn yields_sorted_keys_with_exact_len() {
        let mut tree = RbTree::new().unwrap();
        for key in [50u64, 10, 40, 20, 30, 20] {
            tree.insert(key, key * 2).unwrap();
        }
        let iter = tree.iter();
        assert_eq!(iter.len(), 6);
        let pairs: Vec<(u64, u64)> = (&tree)
            .into_iter()
            .map(|n| (n.key(), *n.payload().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![(10, 20), (20, 40), (20, 40), (30, 60), (40, 80), (50, 100)]
        );
    }
}
