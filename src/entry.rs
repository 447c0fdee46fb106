use serde::Serialize;

use crate::bc::BoundaryCondition;
use crate::error::{NmfError, Result};
use crate::range::Range;

/// Which window of an entry a coordinate belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// 1 or 2, as numbered in the file.
    pub fn number(self) -> usize {
        match self {
            Side::First => 1,
            Side::Second => 2,
        }
    }
}

/// One line of the neutral map: a tagged boundary window, or a pair of
/// windows glued one-to-one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum InterfaceEntry {
    Boundary {
        kind: BoundaryCondition,
        range: Range,
    },
    Connectivity {
        range1: Range,
        range2: Range,
        swap: bool,
    },
}

impl InterfaceEntry {
    /// Boundary entry. `ONE_TO_ONE` needs two windows and is rejected here.
    pub fn boundary(kind: BoundaryCondition, range: Range) -> Result<Self> {
        if kind.is_connectivity() {
            return Err(NmfError::MismatchedWindow(format!(
                "{kind} on block {} face {} has no partner window",
                range.block(),
                range.face()
            )));
        }
        Ok(Self::Boundary { kind, range })
    }

    /// One-to-one entry. With `swap`, the primary direction of `range1` runs
    /// along the secondary direction of `range2` and vice versa.
    pub fn connectivity(range1: Range, range2: Range, swap: bool) -> Result<Self> {
        let (p2, s2) = if swap {
            (range2.sec_node_num(), range2.pri_node_num())
        } else {
            (range2.pri_node_num(), range2.sec_node_num())
        };
        if range1.pri_node_num() != p2 || range1.sec_node_num() != s2 {
            return Err(NmfError::MismatchedWindow(format!(
                "block {} face {} is {}x{} nodes but block {} face {} is {}x{} (swap = {swap})",
                range1.block(),
                range1.face(),
                range1.pri_node_num(),
                range1.sec_node_num(),
                range2.block(),
                range2.face(),
                p2,
                s2,
            )));
        }
        Ok(Self::Connectivity {
            range1,
            range2,
            swap,
        })
    }

    pub fn kind(&self) -> BoundaryCondition {
        match self {
            Self::Boundary { kind, .. } => *kind,
            Self::Connectivity { .. } => BoundaryCondition::OneToOne,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    pub fn range1(&self) -> &Range {
        match self {
            Self::Boundary { range, .. } => range,
            Self::Connectivity { range1, .. } => range1,
        }
    }

    pub fn range2(&self) -> Option<&Range> {
        match self {
            Self::Boundary { .. } => None,
            Self::Connectivity { range2, .. } => Some(range2),
        }
    }

    pub fn range(&self, side: Side) -> Option<&Range> {
        match side {
            Side::First => Some(self.range1()),
            Side::Second => self.range2(),
        }
    }

    /// Both windows, first side first.
    pub fn ranges(&self) -> impl Iterator<Item = (Side, &Range)> {
        std::iter::once((Side::First, self.range1()))
            .chain(self.range2().map(|r| (Side::Second, r)))
    }

    pub fn swap(&self) -> bool {
        matches!(self, Self::Connectivity { swap: true, .. })
    }

    pub fn node_num(&self) -> usize {
        self.range1().node_num()
    }

    pub fn face_num(&self) -> usize {
        self.range1().face_num()
    }

    /// Which window governs node `(pri, sec)` of `face` on `block`.
    pub fn locate(&self, block: usize, face: usize, pri: usize, sec: usize) -> Option<Side> {
        self.ranges()
            .find(|(_, r)| r.is_on(block, face) && r.contains(pri, sec))
            .map(|(side, _)| side)
    }

    /// Image of node `(pri, sec)` of the `from` window on the other window.
    ///
    /// Returns `None` for boundary entries or when the point lies outside
    /// the `from` window.
    pub fn map_point(&self, from: Side, pri: usize, sec: usize) -> Option<(usize, usize)> {
        let Self::Connectivity {
            range1,
            range2,
            swap,
        } = self
        else {
            return None;
        };
        let (src, dst) = match from {
            Side::First => (range1, range2),
            Side::Second => (range2, range1),
        };
        if !src.contains(pri, sec) {
            return None;
        }
        Some(map_window_point(src, dst, *swap, pri, sec))
    }
}

/// Offset-preserving map of `(pri, sec)` from window `src` onto `dst`.
///
/// Each axis keeps its offset from the window start; `swap` exchanges which
/// axis of `dst` receives which offset. Mapping back with the windows
/// exchanged and the same `swap` restores the input.
#[inline]
pub fn map_window_point(src: &Range, dst: &Range, swap: bool, pri: usize, sec: usize) -> (usize, usize) {
    let dp = pri - src.s1();
    let ds = sec - src.s2();
    if swap {
        (dst.s1() + ds, dst.s2() + dp)
    } else {
        (dst.s1() + dp, dst.s2() + ds)
    }
}
