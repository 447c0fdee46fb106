#![allow(dead_code)]

use plot3d_nmf::GridBlock;

/// Two 4x3x2 blocks glued I-max to I-min over the whole face.
pub const TWO_BLOCKS: &str = "\
# two hex blocks in a row
2
1 4 3 2
2 4 3 2
ONE_TO_ONE 1 4 1 3 1 2  2 3 1 3 1 2 FALSE
WALL 1 1 1 4 1 3
WALL 1 2 1 4 1 3
INFLOW 1 3 1 3 1 2
WALL 1 5 1 2 1 4
WALL 1 6 1 2 1 4
WALL 2 1 1 4 1 3
WALL 2 2 1 4 1 3
OUTFLOW 2 4 1 3 1 2
WALL 2 5 1 2 1 4
WALL 2 6 1 2 1 4
";

/// Block 2 sits on top of block 1 with its I and J axes exchanged.
pub const SWAPPED: &str = "\
2
1 3 4 2
2 4 3 2
ONE_TO_ONE 1 2 1 3 1 4  2 1 1 4 1 3 TRUE
WALL 1 1 1 3 1 4
WALL 1 3 1 4 1 2
WALL 1 4 1 4 1 2
WALL 1 5 1 2 1 3
WALL 1 6 1 2 1 3
WALL 2 2 1 4 1 3
WALL 2 3 1 3 1 2
WALL 2 4 1 3 1 2
WALL 2 5 1 2 1 4
WALL 2 6 1 2 1 4
";

/// Header of the 2x2 arrangement of 3x3 quad blocks around one corner.
pub const CORNER_HEADER: &str = "\
4
1 3 3 1
2 3 3 1
3 3 3 1
4 3 3 1
";

/// Entry lines of the 2x2 arrangement. Blocks 1 and 3 share only the
/// centre node and never appear in the same entry.
pub const CORNER_ENTRIES: [&str; 12] = [
    "ONE_TO_ONE 1 2 1 3 1 1  2 1 1 3 1 1 FALSE",
    "ONE_TO_ONE 2 4 1 3 1 1  3 3 1 3 1 1 FALSE",
    "ONE_TO_ONE 3 1 1 3 1 1  4 2 1 3 1 1 FALSE",
    "ONE_TO_ONE 4 3 1 3 1 1  1 4 1 3 1 1 FALSE",
    "WALL 1 1 1 3 1 1",
    "WALL 1 3 1 3 1 1",
    "WALL 2 2 1 3 1 1",
    "WALL 2 3 1 3 1 1",
    "WALL 3 2 1 3 1 1",
    "WALL 3 4 1 3 1 1",
    "WALL 4 1 1 3 1 1",
    "WALL 4 4 1 3 1 1",
];

pub fn corner_map_text(entries: &[&str]) -> String {
    let mut text = CORNER_HEADER.to_string();
    for e in entries {
        text.push_str(e);
        text.push('\n');
    }
    text
}

/// Unit-spaced block whose node (1, 1, 1) sits at `origin`.
pub fn cartesian_block(imax: usize, jmax: usize, kmax: usize, origin: [f64; 3]) -> GridBlock {
    let n = imax * jmax * kmax;
    let (mut x, mut y, mut z) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
    for k in 0..kmax {
        for j in 0..jmax {
            for i in 0..imax {
                x.push(origin[0] + i as f64);
                y.push(origin[1] + j as f64);
                z.push(origin[2] + k as f64);
            }
        }
    }
    GridBlock::new(imax, jmax, kmax, x, y, z).unwrap()
}
