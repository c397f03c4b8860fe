use serde::Serialize;

use crate::tree::RbTree;
use crate::types::Color;

/// Shape and storage summary of a tree.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Logical shape of the tree.
    pub tree: TreeStatsSection,
    /// Layout of the paged slot storage.
    pub storage: StorageStatsSection,
}

/// Logical shape of the tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeStatsSection {
    /// Inserted nodes, sentinel excluded.
    pub len: usize,
    /// Nodes on the longest root-to-leaf path.
    pub height: usize,
    /// Black nodes on the leftmost root-to-leaf path.
    pub black_height: usize,
    /// Red nodes in the tree.
    pub red_nodes: usize,
    /// Key stored at the root.
    pub root_key: Option<u64>,
    /// Smallest key.
    pub min_key: Option<u64>,
    /// Largest key.
    pub max_key: Option<u64>,
    /// Nodes whose key equals the preceding key in order.
    pub duplicate_keys: usize,
}

/// Layout of the paged slot storage.
#[derive(Debug, Clone, Serialize)]
pub struct StorageStatsSection {
    /// Occupied slots, sentinel included.
    pub slots: usize,
    /// Allocated rows.
    pub rows: usize,
    /// Slots per row.
    pub row_width: usize,
    /// Capacity of the row table.
    pub row_table_capacity: usize,
    /// Allocated slots across all rows.
    pub capacity: usize,
    /// `slots / capacity`, between 0 and 1.
    pub utilization: f64,
}

/// Collects a [`StatsReport`] with one in-order pass.
pub fn stats<V>(tree: &RbTree<V>) -> StatsReport {
    let mut red_nodes = 0;
    let mut duplicate_keys = 0;
    let mut min_key = None;
    let mut max_key: Option<u64> = None;
    for node in tree.iter() {
        if node.color() == Color::Red {
            red_nodes += 1;
        }
        if max_key == Some(node.key()) {
            duplicate_keys += 1;
        }
        min_key.get_or_insert(node.key());
        max_key = Some(node.key());
    }

    let shape = tree.storage_shape();
    let root_key = (!tree.is_empty()).then(|| tree.node(tree.root()).key());
    StatsReport {
        tree: TreeStatsSection {
            len: tree.len(),
            height: tree.height(),
            black_height: tree.black_height(),
            red_nodes,
            root_key,
            min_key,
            max_key,
            duplicate_keys,
        },
        storage: StorageStatsSection {
            slots: shape.occupied,
            rows: shape.rows,
            row_width: shape.row_width,
            row_table_capacity: shape.row_table_capacity,
            capacity: shape.capacity,
            utilization: if shape.capacity == 0 {
                0.0
            } else {
                shape.occupied as f64 / shape.capacity as f64
            },
        },
    }
}
