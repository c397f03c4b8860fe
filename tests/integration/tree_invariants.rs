#![allow(missing_docs)]

use std::collections::BTreeMap;

use paged_rbtree::admin::{height_bound, stats, verify, VerifyLevel};
use paged_rbtree::export::to_dot;
use paged_rbtree::keys::{jenkins_one_at_a_time, RecordReader};
use paged_rbtree::tree::{RbTree, TreeOptions};
use paged_rbtree::types::{Color, NodeIdx, RbError};
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn check_links<V>(tree: &RbTree<V>) {
    for node in tree.iter() {
        for child in node.children() {
            if !child.is_nil() {
                assert_eq!(tree.node(child).parent(), node.idx());
            }
        }
        if node.color() == Color::Red {
            for child in node.children() {
                assert_eq!(tree.node(child).color(), Color::Black);
            }
        }
    }
}

#[test]
fn shuffled_keys_keep_every_invariant() {
    let mut keys: Vec<u64> = (0..10_000).collect();
    keys.shuffle(&mut ChaCha8Rng::seed_from_u64(0xBEEF_F00D));

    let mut tree = RbTree::with_options(TreeOptions::new().row_shift(5)).expect("tree");
    for key in &keys {
        tree.insert(*key, *key * 2).expect("insert");
    }

    let report = verify(&tree, VerifyLevel::Full);
    assert!(report.success, "{:?}", report.findings);
    assert!(tree.height() as u64 <= height_bound(tree.len()));
    assert!(tree.keys().eq(0..10_000u64));
    assert_eq!(tree.get(4_321), Some(&8_642));
    check_links(&tree);

    let summary = stats(&tree);
    assert_eq!(summary.storage.slots, 10_001);
    assert_eq!(summary.storage.row_width, 32);
    assert_eq!(summary.storage.rows, 10_001usize.div_ceil(32));
    assert_eq!(summary.tree.min_key, Some(0));
    assert_eq!(summary.tree.max_key, Some(9_999));
}

#[test]
fn sentinel_stays_black_and_unlinked_from_payloads() {
    let mut tree = RbTree::with_options(TreeOptions::new().row_shift(1)).expect("tree");
    for key in 0..64u64 {
        tree.insert(key, key).expect("insert");
        let nil = tree.node(NodeIdx::NIL);
        assert_eq!(nil.color(), Color::Black);
        assert!(nil.payload().is_none());
    }
}

#[test]
fn hashed_records_load_in_key_order() {
    let input = b"delta\nalpha\ncharlie\nbravo\nalpha\n";
    let mut tree = RbTree::new().expect("tree");
    for record in RecordReader::new(&input[..]) {
        let record = record.expect("record");
        tree.insert(record.key(), record.text()).expect("insert");
    }
    assert_eq!(tree.len(), 5);

    let keys: Vec<u64> = tree.keys().collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert_eq!(
        tree.get(jenkins_one_at_a_time(b"charlie")).map(String::as_str),
        Some("charlie")
    );

    let dot = to_dot(&tree).expect("dot");
    assert_eq!(dot.matches("[label=").count(), 5);
    assert_eq!(dot.matches(" -> ").count(), 4);
}

#[test]
fn runs_of_one_key_verify_after_every_insert() {
    let mut tree = RbTree::new().expect("tree");
    let mut issued = Vec::new();
    for i in 0..64u32 {
        issued.push(tree.insert(42, i).expect("insert"));
        let report = verify(&tree, VerifyLevel::Full);
        assert!(report.success, "after {} copies: {:?}", i + 1, report.findings);
    }
    let walked: Vec<NodeIdx> = tree.iter().map(|n| n.idx()).collect();
    assert_eq!(walked, issued);
    check_links(&tree);
}

#[test]
fn capped_storage_fails_cleanly() {
    let opts = TreeOptions::new().row_shift(2).max_rows(2);
    let mut tree = RbTree::with_options(opts).expect("tree");
    let mut inserted = 0;
    let err = loop {
        match tree.insert(inserted, ()) {
            Ok(_) => inserted += 1,
            Err(err) => break err,
        }
    };
    assert!(matches!(err, RbError::OutOfMemory { requested_rows: 3 }));
    assert_eq!(inserted, 7);
    assert_eq!(tree.len(), 7);
    assert!(verify(&tree, VerifyLevel::Full).success);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_a_sorted_multimap(entries in prop::collection::vec((0u64..64, any::<u16>()), 0..300)) {
        let mut tree = RbTree::with_options(TreeOptions::new().row_shift(3)).expect("tree");
        let mut model: BTreeMap<u64, Vec<u16>> = BTreeMap::new();
        for (key, value) in &entries {
            tree.insert(*key, *value).expect("insert");
            model.entry(*key).or_default().push(*value);
        }

        let report = verify(&tree, VerifyLevel::Full);
        prop_assert!(report.success, "{:?}", report.findings);
        prop_assert!(tree.height() as u64 <= height_bound(tree.len()));

        let walked: Vec<(u64, u16)> = tree
            .iter()
            .map(|n| (n.key(), *n.payload().expect("payload")))
            .collect();
        let expected: Vec<(u64, u16)> = model
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (*key, *v)))
            .collect();
        prop_assert_eq!(walked, expected);
    }
}
