mod common;

use common::{cartesian_block, TWO_BLOCKS};
use plot3d_nmf::{
    check_grid_dimensions, max_interface_gap, parse_neutral_map, read_plot3d_ascii, read_plot3d_binary,
    write_plot3d, BinaryFormat, CoordinateProvider, Endian, FloatPrecision, GridBlock, NmfError,
};

fn two_block_grid() -> Vec<GridBlock> {
    vec![
        cartesian_block(4, 3, 2, [0.0, 0.0, 0.0]),
        cartesian_block(4, 3, 2, [3.0, 0.0, 0.0]),
    ]
}

fn assert_same_grid(a: &[GridBlock], b: &[GridBlock]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_eq!((x.imax, x.jmax, x.kmax), (y.imax, y.jmax, y.kmax));
        assert_eq!(x.x, y.x);
        assert_eq!(x.y, y.y);
        assert_eq!(x.z, y.z);
    }
}

#[test]
fn test_ascii_round_trip() {
    let grid = two_block_grid();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.xyz");
    write_plot3d(&path, &grid, false, BinaryFormat::Raw, FloatPrecision::F64, Endian::Little).unwrap();
    let back = read_plot3d_ascii(&path).unwrap();
    assert_same_grid(&grid, &back);
}

#[test]
fn test_binary_round_trips() {
    let grid = two_block_grid();
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        (BinaryFormat::Raw, FloatPrecision::F64, Endian::Little),
        (BinaryFormat::Raw, FloatPrecision::F32, Endian::Big),
        (BinaryFormat::Fortran, FloatPrecision::F64, Endian::Big),
        (BinaryFormat::Fortran, FloatPrecision::F32, Endian::Little),
    ];
    for (n, (format, precision, endian)) in cases.into_iter().enumerate() {
        let path = dir.path().join(format!("grid_{n}.xyz"));
        write_plot3d(&path, &grid, true, format, precision, endian).unwrap();
        let back = read_plot3d_binary(&path, format, precision, endian).unwrap();
        assert_same_grid(&grid, &back);
    }
}

#[test]
fn test_fortran_record_precision_mismatch() {
    let grid = two_block_grid();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.xyz");
    write_plot3d(&path, &grid, true, BinaryFormat::Fortran, FloatPrecision::F32, Endian::Little).unwrap();
    assert!(read_plot3d_binary(&path, BinaryFormat::Fortran, FloatPrecision::F64, Endian::Little).is_err());
}

#[test]
fn test_grid_matches_map() {
    let map = parse_neutral_map(TWO_BLOCKS).unwrap();
    let grid = two_block_grid();
    check_grid_dimensions(&map, &grid).unwrap();
    let gap = max_interface_gap(&map, &grid).unwrap();
    assert!(gap < 1e-12, "gap {gap}");
}

#[test]
fn test_grid_mismatch() {
    let map = parse_neutral_map(TWO_BLOCKS).unwrap();
    let mut grid = two_block_grid();
    grid[1] = cartesian_block(4, 3, 3, [3.0, 0.0, 0.0]);
    assert!(matches!(
        check_grid_dimensions(&map, &grid),
        Err(NmfError::InconsistentTopology(_))
    ));
    assert!(check_grid_dimensions(&map, &grid[..1]).is_err());
}

#[test]
fn test_interface_gap() {
    let map = parse_neutral_map(TWO_BLOCKS).unwrap();
    let grid = vec![
        cartesian_block(4, 3, 2, [0.0, 0.0, 0.0]),
        cartesian_block(4, 3, 2, [3.5, 0.0, 0.0]),
    ];
    let gap = max_interface_gap(&map, &grid).unwrap();
    assert!((gap - 0.5).abs() < 1e-12, "gap {gap}");

    // second block missing entirely
    assert!(max_interface_gap(&map, &grid[..1]).is_err());
}

#[test]
fn test_coordinate_lookup() {
    let grid = two_block_grid();
    assert_eq!(grid.position(2, 1, 1, 1), Some([3.0, 0.0, 0.0]));
    assert_eq!(grid.position(1, 4, 3, 2), Some([3.0, 2.0, 1.0]));
    assert_eq!(grid.position(1, 5, 1, 1), None);
    assert_eq!(grid.position(3, 1, 1, 1), None);
    assert_eq!(grid[0].npoints(), 24);
    assert!(GridBlock::new(2, 2, 2, vec![0.0; 8], vec![0.0; 8], vec![0.0; 7]).is_err());
}

#[test]
fn test_oversized_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.xyz");
    let header: Vec<u8> = [1, u32::MAX, u32::MAX, u32::MAX]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    std::fs::write(&path, header).unwrap();
    assert!(matches!(
        read_plot3d_binary(&path, BinaryFormat::Raw, FloatPrecision::F64, Endian::Little),
        Err(NmfError::InconsistentTopology(_))
    ));

    // block count far beyond the data present
    std::fs::write(&path, u32::MAX.to_le_bytes()).unwrap();
    assert!(read_plot3d_binary(&path, BinaryFormat::Raw, FloatPrecision::F64, Endian::Little).is_err());

    // Fortran record claiming 4 GiB with nothing behind it
    std::fs::write(&path, u32::MAX.to_le_bytes()).unwrap();
    assert!(read_plot3d_binary(&path, BinaryFormat::Fortran, FloatPrecision::F64, Endian::Little).is_err());

    let ascii = dir.path().join("huge.txt");
    std::fs::write(&ascii, "1\n4294967296 4294967296 4294967296\n").unwrap();
    assert!(matches!(read_plot3d_ascii(&ascii), Err(NmfError::Format { line: 2, .. })));

    assert!(GridBlock::new(usize::MAX, 2, 2, vec![], vec![], vec![]).is_err());
}
