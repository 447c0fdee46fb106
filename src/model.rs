use tracing::debug;

use crate::block::{Dimension, StructuredBlock};
use crate::entry::{InterfaceEntry, Side};
use crate::error::{NmfError, Result};
use crate::range::Range;
use crate::topology::{self, ResolvedMap};

/// Blocks and interface entries of one neutral map, in declared order.
///
/// A `NeutralMap` is structurally checked as it is built. Global numbering
/// happens in [`NeutralMap::resolve`], which consumes the map so that a
/// failed resolution leaves nothing half-numbered behind.
#[derive(Clone, Debug, Default)]
pub struct NeutralMap {
    blocks: Vec<StructuredBlock>,
    entries: Vec<InterfaceEntry>,
}

impl NeutralMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(blocks: Vec<StructuredBlock>, entries: Vec<InterfaceEntry>) -> Self {
        Self { blocks, entries }
    }

    pub(crate) fn into_parts(self) -> (Vec<StructuredBlock>, Vec<InterfaceEntry>) {
        (self.blocks, self.entries)
    }

    /// Append a block and return its 1-based index.
    ///
    /// All blocks of a map share one dimensionality.
    pub fn add_block(&mut self, mut block: StructuredBlock) -> Result<usize> {
        if let Some(dim) = self.dimension() {
            if dim != block.dimension() {
                return Err(NmfError::InconsistentTopology(format!(
                    "block {} is {:?}-dimensional but the map is {:?}-dimensional",
                    self.blocks.len() + 1,
                    block.dimension(),
                    dim
                )));
            }
        }
        let index = self.blocks.len() + 1;
        block.set_index(index);
        self.blocks.push(block);
        Ok(index)
    }

    /// Append an entry after checking its windows against the declared blocks.
    pub fn add_entry(&mut self, entry: InterfaceEntry) -> Result<()> {
        for (_, range) in entry.ranges() {
            self.check_range(range)?;
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn dimension(&self) -> Option<Dimension> {
        self.blocks.first().map(StructuredBlock::dimension)
    }

    pub fn n_blk(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &[StructuredBlock] {
        &self.blocks
    }

    /// 1-based block access.
    pub fn block(&self, n: usize) -> Result<&StructuredBlock> {
        if n == 0 || n > self.blocks.len() {
            return Err(NmfError::out_of_range("block", n, 1, self.blocks.len()));
        }
        Ok(&self.blocks[n - 1])
    }

    pub fn entries(&self) -> &[InterfaceEntry] {
        &self.entries
    }

    /// Entries that glue two windows.
    pub fn connectivity_entries(&self) -> impl Iterator<Item = &InterfaceEntry> {
        self.entries.iter().filter(|e| e.is_connectivity())
    }

    pub fn n_cell(&self) -> usize {
        self.blocks.iter().map(StructuredBlock::cell_num).sum()
    }

    /// Distinct faces once one-to-one windows are counted a single time.
    pub fn n_face(&self) -> usize {
        let total: usize = self.blocks.iter().map(StructuredBlock::face_num).sum();
        total - self.shared_face_num()
    }

    pub(crate) fn shared_face_num(&self) -> usize {
        let Some(dim) = self.dimension() else {
            return 0;
        };
        self.connectivity_entries()
            .map(|e| e.range1().face_num_for(dim))
            .sum()
    }

    /// Window lies on a declared block, on a valid face, inside its nodes.
    fn check_range(&self, range: &Range) -> Result<()> {
        let block = self.block(range.block())?;
        let (np, ns) = block.face_extent(range.face())?;
        if range.e1() > np {
            return Err(NmfError::out_of_range("primary window end", range.e1(), 1, np));
        }
        if range.e2() > ns {
            return Err(NmfError::out_of_range("secondary window end", range.e2(), 1, ns));
        }
        Ok(())
    }

    /// Full structural validation: every window is in bounds and the windows
    /// on each block face tile it with no gap and no overlap.
    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(NmfError::InconsistentTopology("map declares no blocks".into()));
        }
        for entry in &self.entries {
            for (_, range) in entry.ranges() {
                self.check_range(range)?;
            }
        }
        let windows = WindowIndex::new(self);
        for block in &self.blocks {
            let planar = !block.is_3d();
            for face in 1..=block.dimension().face_count() {
                let (np, ns) = block.face_extent(face)?;
                let nq = if planar { 1 } else { ns - 1 };
                let mut cover = vec![0u32; (np - 1) * nq];
                for &(e, side) in windows.on(block.index(), face) {
                    let Some(r) = self.entries[e].range(side) else {
                        continue;
                    };
                    let q_hi = if planar { r.s2() } else { r.e2() - 1 };
                    for q in r.s2()..=q_hi {
                        for p in r.s1()..r.e1() {
                            cover[(q - 1) * (np - 1) + (p - 1)] += 1;
                        }
                    }
                }
                for (slot, &n) in cover.iter().enumerate() {
                    if n == 1 {
                        continue;
                    }
                    let (p, q) = (slot % (np - 1) + 1, slot / (np - 1) + 1);
                    let problem = if n == 0 {
                        "is not covered by any entry".to_string()
                    } else {
                        format!("is covered by {n} entries")
                    };
                    return Err(NmfError::InconsistentTopology(format!(
                        "face ({p}, {q}) of block {} face {face} {problem}",
                        block.index()
                    )));
                }
            }
        }
        debug!(
            blocks = self.blocks.len(),
            entries = self.entries.len(),
            "neutral map validated"
        );
        Ok(())
    }

    /// Validate and assign global cell, face and node ids.
    pub fn resolve(self) -> Result<ResolvedMap> {
        topology::resolve(self)
    }
}

/// Entry windows grouped by `(block, face)`.
pub(crate) struct WindowIndex {
    by_face: Vec<Vec<Vec<(usize, Side)>>>,
}

impl WindowIndex {
    pub(crate) fn new(map: &NeutralMap) -> Self {
        Self::build(&map.blocks, &map.entries)
    }

    pub(crate) fn build(blocks: &[StructuredBlock], entries: &[InterfaceEntry]) -> Self {
        let mut by_face: Vec<Vec<Vec<(usize, Side)>>> = blocks
            .iter()
            .map(|b| vec![Vec::new(); b.dimension().face_count()])
            .collect();
        for (e, entry) in entries.iter().enumerate() {
            for (side, r) in entry.ranges() {
                if let Some(slot) = by_face
                    .get_mut(r.block().wrapping_sub(1))
                    .and_then(|faces| faces.get_mut(r.face().wrapping_sub(1)))
                {
                    slot.push((e, side));
                }
            }
        }
        Self { by_face }
    }

    /// `(entry, side)` pairs whose window lies on `face` of `block` (1-based).
    pub(crate) fn on(&self, block: usize, face: usize) -> &[(usize, Side)] {
        self.by_face
            .get(block.wrapping_sub(1))
            .and_then(|faces| faces.get(face.wrapping_sub(1)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
