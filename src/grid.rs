//! Plot3D node coordinates, the geometry side of a neutral map.
//!
//! Topology never reads coordinates. Downstream code uses a
//! [`CoordinateProvider`] to look positions up by `(block, i, j, k)`, and the
//! helpers here check that a coordinate file agrees with a neutral map.

use tracing::warn;

use crate::entry::{map_window_point, InterfaceEntry};
use crate::error::{NmfError, Result};
use crate::model::NeutralMap;

/// Coordinates of one structured block, i fastest then j then k.
#[derive(Clone, Debug)]
pub struct GridBlock {
    pub imax: usize,
    pub jmax: usize,
    pub kmax: usize, // 2D supported via kmax == 1
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl GridBlock {
    pub fn new(
        imax: usize,
        jmax: usize,
        kmax: usize,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    ) -> Result<Self> {
        let n = point_count(imax, jmax, kmax).ok_or_else(|| {
            NmfError::InconsistentTopology(format!("block {imax}x{jmax}x{kmax} has too many nodes to address"))
        })?;
        if x.len() != n || y.len() != n || z.len() != n {
            return Err(NmfError::InconsistentTopology(format!(
                "coordinate arrays hold ({}, {}, {}) values, expected {n} for {imax}x{jmax}x{kmax}",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Ok(Self {
            imax,
            jmax,
            kmax,
            x,
            y,
            z,
        })
    }

    #[inline]
    pub fn npoints(&self) -> usize {
        self.imax * self.jmax * self.kmax
    }

    /// 0-based linear index of 0-based `(i, j, k)`.
    #[inline]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.imax && j < self.jmax && k < self.kmax);
        (k * self.jmax + j) * self.imax + i
    }

    /// Position at 0-based `(i, j, k)`.
    #[inline]
    pub fn xyz(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        let idx = self.idx(i, j, k);
        [self.x[idx], self.y[idx], self.z[idx]]
    }

    /// Position at 1-based `(i, j, k)`, `None` outside the block.
    pub fn position(&self, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        if i == 0 || j == 0 || k == 0 || i > self.imax || j > self.jmax || k > self.kmax {
            return None;
        }
        Some(self.xyz(i - 1, j - 1, k - 1))
    }
}

/// Nodes of an `imax × jmax × kmax` block, `None` when the count overflows.
pub(crate) fn point_count(imax: usize, jmax: usize, kmax: usize) -> Option<usize> {
    imax.checked_mul(jmax)?.checked_mul(kmax)
}

/// Source of node positions addressed the way the neutral map addresses
/// nodes: 1-based block, 1-based `(i, j, k)`.
pub trait CoordinateProvider {
    fn position(&self, block: usize, i: usize, j: usize, k: usize) -> Option<[f64; 3]>;
}

impl CoordinateProvider for [GridBlock] {
    fn position(&self, block: usize, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        self.get(block.checked_sub(1)?)?.position(i, j, k)
    }
}

impl CoordinateProvider for Vec<GridBlock> {
    fn position(&self, block: usize, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        self.as_slice().position(block, i, j, k)
    }
}

/// Check that `grid` declares the same blocks, in the same order and with
/// the same node counts, as `map`.
pub fn check_grid_dimensions(map: &NeutralMap, grid: &[GridBlock]) -> Result<()> {
    if map.n_blk() != grid.len() {
        warn!(map = map.n_blk(), grid = grid.len(), "block count mismatch");
        return Err(NmfError::InconsistentTopology(format!(
            "neutral map declares {} blocks, coordinate file holds {}",
            map.n_blk(),
            grid.len()
        )));
    }
    for (blk, g) in map.blocks().iter().zip(grid) {
        let dims = [g.imax, g.jmax, g.kmax];
        if blk.dims() != dims {
            warn!(block = blk.index(), ?dims, expected = ?blk.dims(), "block dimension mismatch");
            return Err(NmfError::InconsistentTopology(format!(
                "block {} is {:?} in the neutral map but {:?} in the coordinate file",
                blk.index(),
                blk.dims(),
                dims
            )));
        }
    }
    Ok(())
}

/// Largest distance between two nodes glued by a one-to-one entry.
///
/// A conforming grid returns (close to) zero. Fails when a glued node has
/// no coordinate.
pub fn max_interface_gap<P>(map: &NeutralMap, coords: &P) -> Result<f64>
where
    P: CoordinateProvider + ?Sized,
{
    let mut worst = 0.0f64;
    for entry in map.entries() {
        let InterfaceEntry::Connectivity {
            range1,
            range2,
            swap,
        } = entry
        else {
            continue;
        };
        let (b1, b2) = (map.block(range1.block())?, map.block(range2.block())?);
        for q in range1.s2()..=range1.e2() {
            for p in range1.s1()..=range1.e1() {
                let (p2, q2) = map_window_point(range1, range2, *swap, p, q);
                let n1 = b1.face_point(range1.face(), p, q)?;
                let n2 = b2.face_point(range2.face(), p2, q2)?;
                let a = lookup(coords, range1.block(), n1)?;
                let b = lookup(coords, range2.block(), n2)?;
                worst = worst.max(distance(a, b));
            }
        }
    }
    Ok(worst)
}

fn lookup<P>(coords: &P, block: usize, ijk: [usize; 3]) -> Result<[f64; 3]>
where
    P: CoordinateProvider + ?Sized,
{
    coords
        .position(block, ijk[0], ijk[1], ijk[2])
        .ok_or_else(|| {
            NmfError::InconsistentTopology(format!("no coordinate for node {ijk:?} of block {block}"))
        })
}

#[inline]
fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
