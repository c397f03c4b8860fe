#![forbid(unsafe_code)]

//! Graphviz rendering of a tree.

use std::io::Write;

use smallvec::SmallVec;
use tracing::debug;

use crate::tree::RbTree;
use crate::types::{Color, NodeIdx, Result};

fn fill(color: Color) -> &'static str {
    match color {
        Color::Black => "grey",
        Color::Red => "white",
    }
}

/// Writes `tree` as a DOT digraph.
///
/// Each node is declared once as `n<index>` labelled with its key (black
/// nodes grey, red nodes white), followed by its edges. Naming by index
/// keeps duplicate keys apart. The walk is pre-order with an explicit stack.
pub fn write_dot<V, W: Write>(tree: &RbTree<V>, mut out: W) -> Result<()> {
    writeln!(out, "digraph RBTree {{")?;
    writeln!(out, "    node [style=filled, fontname=\"Arial\"];")?;

    let mut stack: SmallVec<[NodeIdx; 64]> = SmallVec::new();
    if !tree.root().is_nil() {
        stack.push(tree.root());
    }
    let mut written = 0usize;
    while let Some(idx) = stack.pop() {
        let node = tree.node(idx);
        writeln!(
            out,
            "    n{idx} [label=\"{}\", fillcolor={}];",
            node.key(),
            fill(node.color())
        )?;
        for child in node.children() {
            if !child.is_nil() {
                writeln!(out, "    n{idx} -> n{child};")?;
            }
        }
        if !node.right().is_nil() {
            stack.push(node.right());
        }
        if !node.left().is_nil() {
            stack.push(node.left());
        }
        written += 1;
    }

    writeln!(out, "}}")?;
    out.flush()?;
    debug!(nodes = written, "export.dot.done");
    Ok(())
}

/// Renders `tree` to a DOT string.
pub fn to_dot<V>(tree: &RbTree<V>) -> Result<String> {
    let mut buf = Vec::new();
    write_dot(tree, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_just_the_frame() {
        let tree: RbTree<()> = RbTree::new().unwrap();
        assert_eq!(
            to_dot(&tree).unwrap(),
            "digraph RBTree {\n    node [style=filled, fontname=\"Arial\"];\n}\n"
        );
    }

    #[test]
    fn three_node_tree() {
        let mut tree = RbTree::new().unwrap();
        for key in [10u64, 20, 30] {
            tree.insert(key, ()).unwrap();
        }
        let expected = "digraph RBTree {\n\
                        \x20   node [style=filled, fontname=\"Arial\"];\n\
                        \x20   n2 [label=\"20\", fillcolor=grey];\n\
                        \x20   n2 -> n1;\n\
                        \x20   n2 -> n3;\n\
                        \x20   n1 [label=\"10\", fillcolor=white];\n\
                        \x20   n3 [label=\"30\", fillcolor=white];\n\
                        }\n";
        assert_eq!(to_dot(&tree).unwrap(), expected);
    }

    #[test]
    fn duplicate_keys_stay_distinct() {
        let mut tree = RbTree::new().unwrap();
        tree.insert(7, ()).unwrap();
        tree.insert(7, ()).unwrap();
        let dot = to_dot(&tree).unwrap();
        assert!(dot.contains("n1 [label=\"7\", fillcolor=grey];"));
        assert!(dot.contains("n2 [label=\"7\", fillcolor=white];"));
        assert!(dot.contains("n1 -> n2;"));
    }

    #[test]
    fn every_node_declared_once() {
        let mut tree = RbTree::new().unwrap();
        for key in 0..100u64 {
            tree.insert(key * 3 % 101, ()).unwrap();
        }
        let dot = to_dot(&tree).unwrap();
        let decls = dot.lines().filter(|l| l.contains("[label=")).count();
        let edges = dot.lines().filter(|l| l.contains("->")).count();
        assert_eq!(decls, 100);
        assert_eq!(edges, 99);
    }
}
