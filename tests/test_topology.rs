mod common;

use std::collections::BTreeSet;

use common::{corner_map_text, CORNER_ENTRIES, SWAPPED, TWO_BLOCKS};
use plot3d_nmf::{parse_neutral_map, Axis, FrameRef, NmfError, ResolvedMap};
use proptest::prelude::*;

fn resolve(text: &str) -> ResolvedMap {
    parse_neutral_map(text).unwrap().resolve().unwrap()
}

/// Every face id referenced by a cell, in block then cell order.
fn cell_faces(resolved: &ResolvedMap) -> Vec<usize> {
    resolved
        .blocks()
        .iter()
        .flat_map(|b| b.cells().iter().flat_map(|c| c.faces().to_vec()))
        .collect()
}

#[test]
fn test_two_blocks_counts() {
    let resolved = resolve(TWO_BLOCKS);
    assert_eq!(resolved.n_cells(), 12);
    assert_eq!(resolved.n_faces(), 56);
    assert_eq!(resolved.n_nodes(), 42);

    let nodes: BTreeSet<usize> = resolved.node_ids().into_iter().collect();
    assert_eq!(nodes.len(), 42);
    assert_eq!(nodes.iter().next_back(), Some(&42));

    let faces: BTreeSet<usize> = cell_faces(&resolved).into_iter().collect();
    assert_eq!(faces.len(), 56);
    assert_eq!(faces.iter().next(), Some(&1));

    let seqs: Vec<usize> = resolved
        .blocks()
        .iter()
        .flat_map(|b| b.cells().iter().map(|c| c.seq()))
        .collect();
    assert_eq!(seqs, (1..=12).collect::<Vec<_>>());
    assert_eq!(resolved.cell(2, 1, 1, 1).unwrap().seq(), 7);
}

#[test]
fn test_two_blocks_share_interface() {
    let resolved = resolve(TWO_BLOCKS);
    for k in 1..=2 {
        for j in 1..=3 {
            assert_eq!(
                resolved.node_id(1, 4, j, k).unwrap(),
                resolved.node_id(2, 1, j, k).unwrap(),
                "node j={j} k={k}"
            );
        }
    }
    assert_ne!(resolved.node_id(1, 3, 1, 1).unwrap(), resolved.node_id(2, 1, 1, 1).unwrap());
    assert_eq!(
        resolved.face_node_ids(1, 4).unwrap(),
        resolved.face_node_ids(2, 3).unwrap()
    );

    for j in 1..=2 {
        assert_eq!(
            resolved.face_id(1, Axis::I, 4, j, 1).unwrap(),
            resolved.face_id(2, Axis::I, 1, j, 1).unwrap()
        );
        let left = resolved.cell(1, 3, j, 1).unwrap();
        let right = resolved.cell(2, 1, j, 1).unwrap();
        // +I face of the left cell is the -I face of the right one
        assert_eq!(left.face(4).unwrap(), right.face(3).unwrap());
        assert_eq!(left.node(2).unwrap(), right.node(1).unwrap());
        assert_eq!(left.node(7).unwrap(), right.node(8).unwrap());
    }
}

#[test]
fn test_two_blocks_frames() {
    let resolved = resolve(TWO_BLOCKS);
    assert_eq!(resolved.n_frame_edges(), 20);
    assert_eq!(resolved.n_frame_surfaces(), 11);

    let b1 = resolved.block(1).unwrap();
    let b2 = resolved.block(2).unwrap();
    assert_eq!(b1.surface(4).unwrap().global_id(), b2.surface(3).unwrap().global_id());
    assert_eq!(b1.surface(4).unwrap().partners(), &[FrameRef { block: 2, local: 3 }]);
    assert_eq!(b2.surface(3).unwrap().partners(), &[FrameRef { block: 1, local: 4 }]);
    assert!(b1.surface(1).unwrap().partners().is_empty());

    for (e1, e2) in [(2, 1), (12, 9), (3, 4), (11, 10)] {
        let a = b1.edge(e1).unwrap();
        let b = b2.edge(e2).unwrap();
        assert_eq!(a.global_id(), b.global_id(), "edges {e1} and {e2}");
        assert_eq!(a.partners(), &[FrameRef { block: 2, local: e2 }]);
    }
    assert!(b1.edge(1).unwrap().partners().is_empty());
    assert_ne!(b1.edge(1).unwrap().global_id(), b2.edge(1).unwrap().global_id());
}

#[test]
fn test_swapped_interface() {
    let resolved = resolve(SWAPPED);
    assert_eq!(resolved.n_cells(), 12);
    assert_eq!(resolved.n_nodes(), 48 - 12);
    assert_eq!(resolved.n_faces(), 29 + 29 - 6);
    for i in 1..=3 {
        for j in 1..=4 {
            assert_eq!(
                resolved.node_id(1, i, j, 2).unwrap(),
                resolved.node_id(2, j, i, 1).unwrap(),
                "node i={i} j={j}"
            );
        }
    }
    for i in 1..=2 {
        for j in 1..=3 {
            assert_eq!(
                resolved.face_id(1, Axis::K, i, j, 2).unwrap(),
                resolved.face_id(2, Axis::K, j, i, 1).unwrap()
            );
        }
    }
}

#[test]
fn test_corner_is_transitive() {
    let resolved = resolve(&corner_map_text(&CORNER_ENTRIES));
    assert_eq!(resolved.n_cells(), 16);
    assert_eq!(resolved.n_nodes(), 25);
    assert_eq!(resolved.n_faces(), 40);
    assert_eq!(resolved.n_frame_edges(), 12);
    assert_eq!(resolved.n_frame_surfaces(), 0);

    // blocks 1 and 3 only meet at the centre
    let centre = resolved.node_id(1, 3, 3, 1).unwrap();
    assert_eq!(resolved.node_id(2, 1, 3, 1).unwrap(), centre);
    assert_eq!(resolved.node_id(3, 1, 1, 1).unwrap(), centre);
    assert_eq!(resolved.node_id(4, 3, 1, 1).unwrap(), centre);

    let cell = resolved.cell(3, 1, 1, 1).unwrap();
    assert_eq!(cell.nodes().len(), 4);
    assert_eq!(cell.node(1).unwrap(), centre);
    assert_eq!(cell.faces().len(), 4);
}

#[test]
fn test_periodic_block() {
    let text = "\
1
1 3 3 1
ONE_TO_ONE 1 1 1 3 1 1  1 2 1 3 1 1 FALSE
WALL 1 3 1 3 1 1
WALL 1 4 1 3 1 1
";
    let resolved = resolve(text);
    assert_eq!(resolved.n_nodes(), 6);
    assert_eq!(resolved.n_faces(), 10);
    assert_eq!(resolved.n_frame_edges(), 3);
    for j in 1..=3 {
        assert_eq!(resolved.node_id(1, 1, j, 1).unwrap(), resolved.node_id(1, 3, j, 1).unwrap());
    }
    let b = resolved.block(1).unwrap();
    assert_eq!(b.edge(1).unwrap().partners(), &[FrameRef { block: 1, local: 2 }]);
}

#[test]
fn test_gap_is_rejected() {
    let text = TWO_BLOCKS.replace("INFLOW 1 3 1 3 1 2\n", "INFLOW 1 3 1 3 1 1\n");
    let map = parse_neutral_map(&text).unwrap();
    let err = map.resolve().unwrap_err();
    assert!(matches!(err, NmfError::InconsistentTopology(_)), "{err}");
    assert!(err.to_string().contains("not covered"));
}

#[test]
fn test_overlap_is_rejected() {
    let text = format!("{TWO_BLOCKS}WALL 2 1 1 2 1 2\n");
    let err = parse_neutral_map(&text).unwrap().resolve().unwrap_err();
    assert!(matches!(err, NmfError::InconsistentTopology(_)), "{err}");
    assert!(err.to_string().contains("covered by 2 entries"));
}

#[test]
fn test_id_queries_check_bounds() {
    let resolved = resolve(&corner_map_text(&CORNER_ENTRIES));
    assert!(resolved.node_id(5, 1, 1, 1).is_err());
    assert!(resolved.node_id(1, 4, 1, 1).is_err());
    assert!(resolved.face_id(1, Axis::K, 1, 1, 1).is_err());
    assert!(resolved.face_id(1, Axis::I, 1, 3, 1).is_err());
    assert!(resolved.cell(1, 1, 1, 2).is_err());
}

#[test]
fn test_summary() {
    let summary = resolve(TWO_BLOCKS).summary();
    assert_eq!(summary.blocks.len(), 2);
    assert_eq!(summary.one_to_one, 1);
    assert_eq!(summary.entries, 11);
    let v = serde_json::to_value(&summary).unwrap();
    assert_eq!(v["dimension"], "Three");
    assert_eq!(v["nodes"], 42);
    assert_eq!(v["faces"], 56);
    assert_eq!(v["blocks"][1]["faces"], 29);
}

#[test]
fn test_resolved_map_keeps_entries() {
    let map = parse_neutral_map(TWO_BLOCKS).unwrap();
    let entries = map.entries().to_vec();
    let resolved = map.resolve().unwrap();
    assert_eq!(resolved.entries(), entries.as_slice());
    assert_eq!(resolved.into_neutral_map().n_blk(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_entry_order_does_not_matter(order in Just(CORNER_ENTRIES.to_vec()).prop_shuffle()) {
        let base = resolve(&corner_map_text(&CORNER_ENTRIES));
        let shuffled = resolve(&corner_map_text(&order));
        prop_assert_eq!(shuffled.n_nodes(), base.n_nodes());
        prop_assert_eq!(shuffled.n_faces(), base.n_faces());
        prop_assert_eq!(shuffled.node_ids(), base.node_ids());
        prop_assert_eq!(cell_faces(&shuffled), cell_faces(&base));
    }
}
