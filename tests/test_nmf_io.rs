mod common;

use common::{corner_map_text, CORNER_ENTRIES, SWAPPED, TWO_BLOCKS};
use plot3d_nmf::{
    neutral_map_to_string, parse_neutral_map, parse_neutral_map_with, read_neutral_map,
    write_neutral_map, BoundaryCondition, Dimension, NmfError, ReadOptions,
};

#[test]
fn test_parse_two_blocks() {
    let map = parse_neutral_map(TWO_BLOCKS).unwrap();
    assert_eq!(map.n_blk(), 2);
    assert_eq!(map.dimension(), Some(Dimension::Three));
    assert_eq!(map.block(2).unwrap().dims(), [4, 3, 2]);
    assert_eq!(map.entries().len(), 11);
    assert_eq!(map.connectivity_entries().count(), 1);
    assert_eq!(map.entries()[3].kind(), BoundaryCondition::Inflow);
    assert_eq!(map.n_cell(), 12);
    assert_eq!(map.n_face(), 2 * 29 - 2);
    map.validate().unwrap();
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in [("two_blocks", TWO_BLOCKS), ("swapped", SWAPPED)] {
        let map = parse_neutral_map(text).unwrap();
        let path = dir.path().join(format!("{name}.nmf"));
        write_neutral_map(&path, &map).unwrap();

        let back = read_neutral_map(&path).unwrap();
        assert_eq!(back.n_blk(), map.n_blk());
        assert_eq!(back.entries(), map.entries());
        for (a, b) in back.blocks().iter().zip(map.blocks()) {
            assert_eq!(a.dims(), b.dims());
        }
        assert_eq!(neutral_map_to_string(&back), neutral_map_to_string(&map));
    }

    let swapped = parse_neutral_map(SWAPPED).unwrap();
    let text = neutral_map_to_string(&swapped);
    assert!(text.lines().any(|l| l.starts_with("ONE_TO_ONE") && l.ends_with("      TRUE")));
    let back = parse_neutral_map(&text).unwrap();
    let o2o = back.connectivity_entries().next().unwrap();
    assert!(o2o.swap());
}

#[test]
fn test_column_layout() {
    let map = parse_neutral_map(TWO_BLOCKS).unwrap();
    let text = neutral_map_to_string(&map);
    let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(lines[0], "       2");
    assert_eq!(lines[1], "       1       4       3       2");

    let o2o = lines[3];
    assert_eq!(o2o.len(), 13 + 6 + 6 + 9 + 6 + 9 + 6 + 9 + 6 + 9 + 6 + 9 + 6 + 10);
    assert!(o2o.starts_with("ONE_TO_ONE   "));
    assert!(o2o.ends_with("     FALSE"));

    let wall = lines[4];
    assert_eq!(wall.len(), 13 + 6 + 6 + 9 + 6 + 9 + 6);
    assert_eq!(
        wall.split_whitespace().collect::<Vec<_>>(),
        vec!["WALL", "1", "1", "1", "4", "1", "3"]
    );
}

#[test]
fn test_planar_round_trip() {
    let map = parse_neutral_map(&corner_map_text(&CORNER_ENTRIES)).unwrap();
    assert_eq!(map.dimension(), Some(Dimension::Two));
    let back = parse_neutral_map(&neutral_map_to_string(&map)).unwrap();
    assert_eq!(back.entries(), map.entries());
    assert_eq!(back.block(4).unwrap().kdim(), 1);
}

#[test]
fn test_comments_and_case() {
    let text = "\
! custom comment
1
   ! indented comment

1 2 2 2
one-to-one 1 1 1 2 1 2 1 2 1 2 1 2 true
symmetry 1 3 1 2 1 2
wall 1 4 1 2 1 2
WALL 1 5 1 2 1 2
WALL 1 6 1 2 1 2
";
    let map = parse_neutral_map_with(text, &ReadOptions { comment: '!' }).unwrap();
    assert_eq!(map.entries().len(), 5);
    assert!(map.entries()[0].swap());
    assert_eq!(map.entries()[1].kind(), BoundaryCondition::Sym);
}

#[test]
fn test_unknown_boundary_condition() {
    let text = "1\n1 2 2 2\nFARFIELD 1 1 1 2 1 2\n";
    assert!(matches!(
        parse_neutral_map(text),
        Err(NmfError::UnknownBoundaryCondition(ref s)) if s == "FARFIELD"
    ));
}

#[test]
fn test_block_order_and_token_errors() {
    let bad_order = "2\n2 3 3 3\n1 3 3 3\nWALL 1 1 1 3 1 3\n";
    assert!(matches!(
        parse_neutral_map(bad_order),
        Err(NmfError::Format { line: 2, .. })
    ));

    let missing = "1\n1 3 3 3\nWALL 1 1 1 3 1\n";
    assert!(matches!(
        parse_neutral_map(missing),
        Err(NmfError::Format { line: 3, .. })
    ));

    let extra = "1\n1 3 3 3\nWALL 1 1 1 3 1 3 7\n";
    assert!(matches!(
        parse_neutral_map(extra),
        Err(NmfError::Format { line: 3, .. })
    ));

    let swap = "1\n1 3 3 3\nONE_TO_ONE 1 1 1 3 1 3 1 2 1 3 1 3 YES\n";
    assert!(matches!(
        parse_neutral_map(swap),
        Err(NmfError::Format { line: 3, .. })
    ));

    assert!(matches!(parse_neutral_map("0\n"), Err(NmfError::Format { line: 1, .. })));
    assert!(matches!(
        parse_neutral_map("1\n1 3 3 3\n"),
        Err(NmfError::Format { .. })
    ));
}

#[test]
fn test_semantic_errors() {
    // window past the block face
    let text = "1\n1 3 3 3\nWALL 1 1 1 4 1 3\n";
    assert!(matches!(
        parse_neutral_map(text),
        Err(NmfError::IndexOutOfRange { .. })
    ));
    // block 2 is not declared
    let text = "1\n1 3 3 3\nWALL 2 1 1 3 1 3\n";
    assert!(matches!(
        parse_neutral_map(text),
        Err(NmfError::IndexOutOfRange { what: "block", .. })
    ));
    let text = "1\n1 1 3 3\nWALL 1 1 1 1 1 3\n";
    assert!(matches!(
        parse_neutral_map(text),
        Err(NmfError::InvalidDimension { .. })
    ));
    let text = "1\n1 3 3 3\nONE_TO_ONE 1 1 1 3 1 3 1 2 1 2 1 3 FALSE\n";
    assert!(matches!(
        parse_neutral_map(text),
        Err(NmfError::MismatchedWindow(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.nmf");
    assert!(matches!(
        read_neutral_map(&path),
        Err(NmfError::File { path: ref p, .. }) if *p == path
    ));
}
