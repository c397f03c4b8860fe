use serde::Serialize;
use tracing::debug;

use crate::tree::RbTree;
use crate::types::{Color, NodeIdx};

const MAX_FINDINGS: usize = 32;

/// Specifies the depth of verification checks to perform.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerifyLevel {
    /// Sentinel, root and slot accounting only; no tree walk.
    Fast,
    /// Walks every reachable node and checks every invariant.
    Full,
}

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// Informational message about the verification process.
    Info,
    /// Broken invariant.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Human-readable description of the issue.
    pub message: String,
}

impl VerifyFinding {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: VerifySeverity::Error,
            message: message.into(),
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            severity: VerifySeverity::Info,
            message: message.into(),
        }
    }
}

/// Tallies collected while walking the tree.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifyCounts {
    /// Non-sentinel nodes reachable from the root.
    pub nodes_reachable: u64,
    /// Reachable red nodes.
    pub red_nodes: u64,
    /// Reachable black nodes.
    pub black_nodes: u64,
    /// Black nodes per root-to-leaf path, when every path agrees.
    pub black_height: Option<u64>,
    /// Nodes on the longest root-to-leaf path.
    pub height: u64,
}

/// Complete report of a verification operation.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// The verification level that was performed.
    pub level: VerifyLevel,
    /// Whether verification passed without finding any issues.
    pub success: bool,
    /// List of issues discovered during verification.
    pub findings: Vec<VerifyFinding>,
    /// Statistics about the nodes examined.
    pub counts: VerifyCounts,
}

impl VerifyReport {
    /// Iterates the error findings only.
    pub fn errors(&self) -> impl Iterator<Item = &VerifyFinding> {
        self.findings
            .iter()
            .filter(|f| f.severity == VerifySeverity::Error)
    }
}

/// Largest height a red-black tree with `n` nodes may have: `2·log2(n+1)`.
pub fn height_bound(n: usize) -> u64 {
    (2.0 * ((n as f64) + 1.0).log2()).floor() as u64
}

/// Checks the red-black and search-order invariants of `tree`.
///
/// - `VerifyLevel::Fast`: sentinel color, root color and slot accounting
/// - `VerifyLevel::Full`: additionally walks every reachable node, checking
///   link symmetry, red-red edges, black height, key order, reachability
///   and the height bound
///
/// The walk uses an explicit stack and a visited bitmap, so a corrupted
/// link cycle is reported instead of looping.
pub fn verify<V>(tree: &RbTree<V>, level: VerifyLevel) -> VerifyReport {
    let mut findings = Vec::new();
    let mut counts = VerifyCounts::default();

    let sentinel = tree.node(tree.sentinel());
    if sentinel.color() != Color::Black {
        push_error(&mut findings, "sentinel is not black");
    }
    if tree.slots() != tree.len() + 1 {
        push_error(
            &mut findings,
            format!(
                "slot count {} does not equal len {} plus the sentinel",
                tree.slots(),
                tree.len()
            ),
        );
    }
    let root = tree.root();
    if root.is_nil() != (tree.len() == 0) {
        push_error(
            &mut findings,
            format!("root is {root} but {} nodes were inserted", tree.len()),
        );
    }
    if !root.is_nil() {
        match tree.get_node(root) {
            Some(node) => {
                if node.color() != Color::Black {
                    push_error(&mut findings, format!("root {root} is red"));
                }
                if !node.parent().is_nil() {
                    push_error(&mut findings, format!("root {root} has a parent"));
                }
            }
            None => push_error(&mut findings, format!("root {root} is not an issued slot")),
        }
    }

    if matches!(level, VerifyLevel::Full) {
        walk(tree, &mut findings, &mut counts);
        if counts.nodes_reachable != tree.len() as u64 {
            push_error(
                &mut findings,
                format!(
                    "{} nodes reachable from the root but {} inserted",
                    counts.nodes_reachable,
                    tree.len()
                ),
            );
        }
        let bound = height_bound(tree.len());
        if counts.height > bound {
            push_error(
                &mut findings,
                format!("height {} exceeds bound {bound}", counts.height),
            );
        } else {
            findings.push(VerifyFinding::info(format!(
                "height {} within bound {bound}",
                counts.height
            )));
        }
    }

    let success = !findings
        .iter()
        .any(|f| f.severity == VerifySeverity::Error);
    debug!(
        ?level,
        success,
        nodes = counts.nodes_reachable,
        "admin.verify.done"
    );
    VerifyReport {
        level,
        success,
        findings,
        counts,
    }
}

struct Frame {
    idx: NodeIdx,
    parent: NodeIdx,
    /// Lower bound inherited from right turns.
    low: Option<u64>,
    /// Upper bound inherited from left turns. Inclusive, because a rotation
    /// can lift a later duplicate above an earlier one.
    high: Option<u64>,
    blacks: u64,
    depth: u64,
}

fn walk<V>(tree: &RbTree<V>, findings: &mut Vec<VerifyFinding>, counts: &mut VerifyCounts) {
    let mut visited = vec![false; tree.slots()];
    let mut path_blacks: Option<u64> = None;
    let mut uniform = true;
    let mut stack = vec![Frame {
        idx: tree.root(),
        parent: NodeIdx::NIL,
        low: None,
        high: None,
        blacks: 0,
        depth: 0,
    }];

    while let Some(frame) = stack.pop() {
        if frame.idx.is_nil() {
            match path_blacks {
                None => path_blacks = Some(frame.blacks),
                Some(expected) if expected != frame.blacks => {
                    if uniform {
                        push_error(
                            findings,
                            format!(
                                "black height differs across paths ({expected} vs {}) below {}",
                                frame.blacks, frame.parent
                            ),
                        );
                    }
                    uniform = false;
                }
                Some(_) => {}
            }
            continue;
        }

        let Some(node) = tree.get_node(frame.idx) else {
            push_error(
                findings,
                format!("{} links to unissued slot {}", frame.parent, frame.idx),
            );
            continue;
        };
        let slot = frame.idx.0 as usize;
        if visited[slot] {
            push_error(findings, format!("node {} reached twice", frame.idx));
            continue;
        }
        visited[slot] = true;

        counts.nodes_reachable += 1;
        counts.height = counts.height.max(frame.depth + 1);
        if node.parent() != frame.parent {
            push_error(
                findings,
                format!(
                    "node {} records parent {} but hangs under {}",
                    frame.idx,
                    node.parent(),
                    frame.parent
                ),
            );
        }
        let key = node.key();
        if frame.low.is_some_and(|low| key < low) || frame.high.is_some_and(|high| key > high) {
            push_error(
                findings,
                format!("node {} key {key} is out of search order", frame.idx),
            );
        }

        let blacks = match node.color() {
            Color::Red => {
                counts.red_nodes += 1;
                for child in node.children() {
                    if !child.is_nil()
                        && tree.get_node(child).is_some_and(|c| c.color() == Color::Red)
                    {
                        push_error(
                            findings,
                            format!("red node {} has red child {child}", frame.idx),
                        );
                    }
                }
                frame.blacks
            }
            Color::Black => {
                counts.black_nodes += 1;
                frame.blacks + 1
            }
        };

        stack.push(Frame {
            idx: node.right(),
            parent: frame.idx,
            low: Some(key),
            high: frame.high,
            blacks,
            depth: frame.depth + 1,
        });
        stack.push(Frame {
            idx: node.left(),
            parent: frame.idx,
            low: frame.low,
            high: Some(key),
            blacks,
            depth: frame.depth + 1,
        });
    }

    counts.black_height = if uniform { path_blacks } else { None };
}

fn push_error(findings: &mut Vec<VerifyFinding>, message: impl Into<String>) {
    if findings.len() < MAX_FINDINGS {
        findings.push(VerifyFinding::error(message));
    }
}
