use serde::Serialize;

use crate::block::Dimension;
use crate::error::{NmfError, Result};

/// Rectangular node window on one block face.
///
/// `s1..=e1` runs along the face's primary direction and `s2..=e2` along its
/// secondary direction. All indices are 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    block: usize,
    face: usize,
    s1: usize,
    e1: usize,
    s2: usize,
    e2: usize,
}

impl Range {
    pub fn new(block: usize, face: usize, s1: usize, e1: usize, s2: usize, e2: usize) -> Result<Self> {
        if block == 0 || face == 0 || s1 == 0 || s2 == 0 {
            return Err(NmfError::InvalidRange(format!(
                "indices are 1-based: block {block}, face {face}, s1 {s1}, s2 {s2}"
            )));
        }
        if s1 > e1 || s2 > e2 {
            return Err(NmfError::InvalidRange(format!(
                "start exceeds end on block {block} face {face}: ({s1}..{e1}, {s2}..{e2})"
            )));
        }
        Ok(Self {
            block,
            face,
            s1,
            e1,
            s2,
            e2,
        })
    }

    /// Build from `[block, face, s1, e1, s2, e2]` as laid out in the file.
    pub fn from_fields(f: [usize; 6]) -> Result<Self> {
        Self::new(f[0], f[1], f[2], f[3], f[4], f[5])
    }

    pub fn fields(&self) -> [usize; 6] {
        [self.block, self.face, self.s1, self.e1, self.s2, self.e2]
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn face(&self) -> usize {
        self.face
    }

    pub fn s1(&self) -> usize {
        self.s1
    }

    pub fn e1(&self) -> usize {
        self.e1
    }

    pub fn s2(&self) -> usize {
        self.s2
    }

    pub fn e2(&self) -> usize {
        self.e2
    }

    /// True when `(block, face)` is the face this window lives on.
    #[inline]
    pub fn is_on(&self, block: usize, face: usize) -> bool {
        self.block == block && self.face == face
    }

    /// Node `(pri, sec)` lies inside the window.
    #[inline]
    pub fn contains(&self, pri: usize, sec: usize) -> bool {
        (self.s1..=self.e1).contains(&pri) && (self.s2..=self.e2).contains(&sec)
    }

    /// The face whose lower corner is `(pri, sec)` lies inside the window.
    /// Planar faces are segments, so only the primary direction advances.
    #[inline]
    pub fn covers_face(&self, pri: usize, sec: usize, planar: bool) -> bool {
        let sec_hi = if planar { sec } else { sec + 1 };
        self.contains(pri, sec) && self.contains(pri + 1, sec_hi)
    }

    /// Nodes in the primary direction.
    pub fn pri_node_num(&self) -> usize {
        self.e1 - self.s1 + 1
    }

    /// Nodes in the secondary direction.
    pub fn sec_node_num(&self) -> usize {
        self.e2 - self.s2 + 1
    }

    pub fn node_num(&self) -> usize {
        self.pri_node_num() * self.sec_node_num()
    }

    /// Grid segments inside the window, both directions.
    pub fn edge_num(&self) -> usize {
        let n_pri = (self.pri_node_num() - 1) * self.sec_node_num();
        let n_sec = (self.sec_node_num() - 1) * self.pri_node_num();
        n_pri + n_sec
    }

    /// Quad faces inside the window.
    pub fn face_num(&self) -> usize {
        (self.pri_node_num() - 1) * (self.sec_node_num() - 1)
    }

    /// Block faces covered by the window: quads on a 3D block, segments on a
    /// 2D block (where the window is a single line).
    pub fn face_num_for(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Two => self.edge_num(),
            Dimension::Three => self.face_num(),
        }
    }
}
