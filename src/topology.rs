//! Global numbering of a neutral map.
//!
//! Resolution runs in ordered stages over a validated map:
//!
//! 1. cells get a running sequence, block by block, k outermost;
//! 2. faces get ids in raster order, and a face inside a one-to-one window
//!    shares its id with the partner face reached through the window mapping;
//! 3. nodes are merged in a disjoint-set over every block-local node position,
//!    one union per pair of glued nodes, and each class gets one id;
//! 4. block frames (edges and surfaces) are coloured from the node classes.
//!
//! Nodes shared by several blocks around an edge or corner are caught by the
//! transitive closure of the disjoint-set, even when no single entry relates
//! two of those blocks directly.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::block::{Axis, Cell, Dimension, FrameRef, StructuredBlock};
use crate::entry::{map_window_point, InterfaceEntry, Side};
use crate::error::{NmfError, Result};
use crate::model::{NeutralMap, WindowIndex};

/// Union-find with path halving and union by rank.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            sets: n,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the class holding `x`.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the classes of `a` and `b`; false when they were already one.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        self.sets -= 1;
        true
    }

    /// Number of distinct classes.
    pub fn set_count(&self) -> usize {
        self.sets
    }
}

/// A neutral map whose cells, faces, nodes and frames carry global ids.
///
/// Only produced by a successful [`NeutralMap::resolve`].
#[derive(Clone, Debug)]
pub struct ResolvedMap {
    map: NeutralMap,
    n_cells: usize,
    n_faces: usize,
    n_nodes: usize,
    n_frame_edges: usize,
    n_frame_surfaces: usize,
}

/// Per-block counts of a [`TopologySummary`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub index: usize,
    pub dims: [usize; 3],
    pub cells: usize,
    pub faces: usize,
    pub nodes: usize,
}

/// Serializable overview of a resolved map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TopologySummary {
    pub dimension: Dimension,
    pub blocks: Vec<BlockSummary>,
    pub entries: usize,
    pub one_to_one: usize,
    pub cells: usize,
    pub faces: usize,
    pub nodes: usize,
    pub frame_edges: usize,
    pub frame_surfaces: usize,
}

impl ResolvedMap {
    /// The underlying map, e.g. for re-serialization.
    pub fn neutral_map(&self) -> &NeutralMap {
        &self.map
    }

    pub fn into_neutral_map(self) -> NeutralMap {
        self.map
    }

    pub fn blocks(&self) -> &[StructuredBlock] {
        self.map.blocks()
    }

    pub fn block(&self, n: usize) -> Result<&StructuredBlock> {
        self.map.block(n)
    }

    pub fn entries(&self) -> &[InterfaceEntry] {
        self.map.entries()
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn n_faces(&self) -> usize {
        self.n_faces
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Distinct frame edges after gluing.
    pub fn n_frame_edges(&self) -> usize {
        self.n_frame_edges
    }

    pub fn n_frame_surfaces(&self) -> usize {
        self.n_frame_surfaces
    }

    /// 1-based cell access on block `block`.
    pub fn cell(&self, block: usize, i: usize, j: usize, k: usize) -> Result<&Cell> {
        self.block(block)?.cell(i, j, k)
    }

    /// Global id of node `(i, j, k)` on `block`.
    pub fn node_id(&self, block: usize, i: usize, j: usize, k: usize) -> Result<usize> {
        let blk = self.block(block)?;
        blk.check_node([i, j, k])?;
        Ok(blk.node_ids[blk.node_slot([i, j, k])])
    }

    /// Global id of the face normal to `axis` whose lower corner is `(i, j, k)`.
    pub fn face_id(&self, block: usize, axis: Axis, i: usize, j: usize, k: usize) -> Result<usize> {
        let blk = self.block(block)?;
        if !blk.face_axes().any(|a| a == axis) {
            return Err(NmfError::out_of_range("face axis", axis.index() + 1, 1, 2));
        }
        let ext = blk.face_family_dims(axis);
        for (what, v, hi) in [("face i", i, ext[0]), ("face j", j, ext[1]), ("face k", k, ext[2])] {
            if v == 0 || v > hi {
                return Err(NmfError::out_of_range(what, v, 1, hi));
            }
        }
        Ok(blk.face_ids[axis.index()][blk.face_slot(axis, [i, j, k])])
    }

    /// Node ids over block face `face`, secondary-outer, primary-inner.
    pub fn face_node_ids(&self, block: usize, face: usize) -> Result<Vec<usize>> {
        let blk = self.block(block)?;
        Ok(blk
            .face_nodes(face)?
            .into_iter()
            .map(|ijk| blk.node_ids[blk.node_slot(ijk)])
            .collect())
    }

    /// Every node id of every block, in block then k/j/i order.
    pub fn node_ids(&self) -> Vec<usize> {
        self.blocks()
            .iter()
            .flat_map(|b| b.node_ids.iter().copied())
            .collect()
    }

    pub fn summary(&self) -> TopologySummary {
        let blocks = self
            .blocks()
            .iter()
            .map(|b| BlockSummary {
                index: b.index(),
                dims: b.dims(),
                cells: b.cell_num(),
                faces: b.face_num(),
                nodes: b.node_num(),
            })
            .collect();
        TopologySummary {
            dimension: self.map.dimension().unwrap_or(Dimension::Three),
            blocks,
            entries: self.entries().len(),
            one_to_one: self.map.connectivity_entries().count(),
            cells: self.n_cells,
            faces: self.n_faces,
            nodes: self.n_nodes,
            frame_edges: self.n_frame_edges,
            frame_surfaces: self.n_frame_surfaces,
        }
    }
}

/// Run every stage on `map`. Any failure drops the map.
pub fn resolve(map: NeutralMap) -> Result<ResolvedMap> {
    map.validate()?;
    let expected_faces = map.n_face();
    let (mut blocks, entries) = map.into_parts();

    let n_cells = number_cells(&mut blocks)?;
    debug!(cells = n_cells, "cells numbered");

    let n_faces = number_faces(&mut blocks, &entries, expected_faces)?;
    debug!(faces = n_faces, "faces numbered");

    let n_nodes = number_nodes(&mut blocks, &entries)?;
    debug!(nodes = n_nodes, "nodes numbered");

    for blk in &mut blocks {
        fill_cells(blk);
    }

    let (n_frame_edges, n_frame_surfaces) = color_frames(&mut blocks, &entries)?;
    debug!(
        edges = n_frame_edges,
        surfaces = n_frame_surfaces,
        "block frames coloured"
    );

    info!(
        blocks = blocks.len(),
        cells = n_cells,
        faces = n_faces,
        nodes = n_nodes,
        "topology resolved"
    );
    Ok(ResolvedMap {
        map: NeutralMap::from_parts(blocks, entries),
        n_cells,
        n_faces,
        n_nodes,
        n_frame_edges,
        n_frame_surfaces,
    })
}

fn number_cells(blocks: &mut [StructuredBlock]) -> Result<usize> {
    let expected: usize = blocks.iter().map(StructuredBlock::cell_num).sum();
    let mut cnt = 0;
    for blk in blocks.iter_mut() {
        // Cells are stored k-outermost, i-innermost.
        for cell in blk.cells_mut() {
            cnt += 1;
            cell.seq = cnt;
        }
    }
    if cnt != expected {
        return Err(NmfError::InconsistentTopology(format!(
            "numbered {cnt} cells, expected {expected}"
        )));
    }
    Ok(cnt)
}

/// Partner `(block index 0-based, axis, ijk)` of a boundary face glued by a
/// one-to-one window, if any.
fn partner_face(
    blocks: &[StructuredBlock],
    entries: &[InterfaceEntry],
    windows: &WindowIndex,
    b: usize,
    axis: Axis,
    ijk: [usize; 3],
) -> Result<Option<(usize, Axis, [usize; 3])>> {
    let blk = &blocks[b];
    let a = axis.index();
    let at_max = if ijk[a] == 1 {
        false
    } else if ijk[a] == blk.dims()[a] {
        true
    } else {
        return Ok(None);
    };
    let face = blk.face_number(axis, at_max);
    let (p, q) = blk.block_face(face)?.project(ijk);
    let planar = !blk.is_3d();

    for &(e, side) in windows.on(blk.index(), face) {
        let InterfaceEntry::Connectivity {
            range1,
            range2,
            swap,
        } = &entries[e]
        else {
            continue;
        };
        let (src, dst) = match side {
            Side::First => (range1, range2),
            Side::Second => (range2, range1),
        };
        if !src.covers_face(p, q, planar) {
            continue;
        }
        let (p2, q2) = map_window_point(src, dst, *swap, p, q);
        let b2 = dst.block() - 1;
        let other = &blocks[b2];
        let bf2 = other.block_face(dst.face())?;
        return Ok(Some((b2, bf2.fixed, bf2.point(other.dims(), p2, q2))));
    }
    Ok(None)
}

fn number_faces(
    blocks: &mut [StructuredBlock],
    entries: &[InterfaceEntry],
    expected: usize,
) -> Result<usize> {
    for blk in blocks.iter_mut() {
        let lens: Vec<(Axis, usize)> = blk.face_axes().map(|a| (a, blk.face_family_len(a))).collect();
        for (axis, len) in lens {
            blk.face_ids[axis.index()] = vec![0; len];
        }
    }
    let windows = WindowIndex::build(blocks, entries);

    let mut cnt = 0;
    for b in 0..blocks.len() {
        let axes: Vec<Axis> = blocks[b].face_axes().collect();
        for axis in axes {
            let a = axis.index();
            let ext = blocks[b].face_family_dims(axis);
            for k in 1..=ext[2] {
                for j in 1..=ext[1] {
                    for i in 1..=ext[0] {
                        let ijk = [i, j, k];
                        let slot = blocks[b].face_slot(axis, ijk);
                        if blocks[b].face_ids[a][slot] != 0 {
                            continue;
                        }
                        cnt += 1;
                        blocks[b].face_ids[a][slot] = cnt;

                        let Some((b2, axis2, ijk2)) =
                            partner_face(blocks, entries, &windows, b, axis, ijk)?
                        else {
                            continue;
                        };
                        let slot2 = blocks[b2].face_slot(axis2, ijk2);
                        let prev = blocks[b2].face_ids[axis2.index()][slot2];
                        if prev != 0 && prev != cnt {
                            return Err(NmfError::InconsistentTopology(format!(
                                "face {ijk2:?} of block {} is glued twice (ids {prev} and {cnt})",
                                b2 + 1
                            )));
                        }
                        blocks[b2].face_ids[axis2.index()][slot2] = cnt;
                    }
                }
            }
        }
    }
    if cnt != expected {
        return Err(NmfError::InconsistentTopology(format!(
            "numbered {cnt} faces, expected {expected}"
        )));
    }
    Ok(cnt)
}

fn number_nodes(blocks: &mut [StructuredBlock], entries: &[InterfaceEntry]) -> Result<usize> {
    let mut offsets = Vec::with_capacity(blocks.len());
    let mut total = 0;
    for blk in blocks.iter() {
        offsets.push(total);
        total += blk.node_num();
    }

    let mut set = DisjointSet::new(total);
    let mut merges = 0;
    for entry in entries {
        let InterfaceEntry::Connectivity {
            range1,
            range2,
            swap,
        } = entry
        else {
            continue;
        };
        let (b1, b2) = (range1.block() - 1, range2.block() - 1);
        let f1 = blocks[b1].block_face(range1.face())?;
        let f2 = blocks[b2].block_face(range2.face())?;
        for q in range1.s2()..=range1.e2() {
            for p in range1.s1()..=range1.e1() {
                let (p2, q2) = map_window_point(range1, range2, *swap, p, q);
                let n1 = offsets[b1] + blocks[b1].node_slot(f1.point(blocks[b1].dims(), p, q));
                let n2 = offsets[b2] + blocks[b2].node_slot(f2.point(blocks[b2].dims(), p2, q2));
                if set.union(n1, n2) {
                    merges += 1;
                }
            }
        }
    }

    // Ids follow the first appearance of each class in raster order, so they
    // do not depend on the order the entries were merged in.
    let mut class_id = vec![0usize; total];
    let mut cnt = 0;
    for (b, blk) in blocks.iter_mut().enumerate() {
        let mut ids = Vec::with_capacity(blk.node_num());
        for local in 0..blk.node_num() {
            let root = set.find(offsets[b] + local);
            if class_id[root] == 0 {
                cnt += 1;
                class_id[root] = cnt;
            }
            ids.push(class_id[root]);
        }
        blk.node_ids = ids;
    }

    let expected = total - merges;
    if cnt != expected || cnt != set.set_count() {
        return Err(NmfError::InconsistentTopology(format!(
            "numbered {cnt} nodes, expected {expected}"
        )));
    }
    Ok(cnt)
}

/// Copy node and face ids into every cell of `blk`.
fn fill_cells(blk: &mut StructuredBlock) {
    let ext = blk.cell_extents();
    let hex = blk.is_3d();
    let mut conn = Vec::with_capacity(blk.cell_num());
    for k in 1..=ext[2] {
        for j in 1..=ext[1] {
            for i in 1..=ext[0] {
                let mut nodes = [0usize; 8];
                let mut faces = [0usize; 6];
                let node = |ijk: [usize; 3]| blk.node_ids[blk.node_slot(ijk)];
                let face = |axis: Axis, ijk: [usize; 3]| blk.face_ids[axis.index()][blk.face_slot(axis, ijk)];
                let ring = [[i, j], [i + 1, j], [i + 1, j + 1], [i, j + 1]];
                for (n, [ii, jj]) in ring.iter().copied().enumerate() {
                    nodes[n] = node([ii, jj, k]);
                    if hex {
                        nodes[n + 4] = node([ii, jj, k + 1]);
                    }
                }
                if hex {
                    faces = [
                        face(Axis::K, [i, j, k]),
                        face(Axis::K, [i, j, k + 1]),
                        face(Axis::I, [i, j, k]),
                        face(Axis::I, [i + 1, j, k]),
                        face(Axis::J, [i, j, k]),
                        face(Axis::J, [i, j + 1, k]),
                    ];
                } else {
                    faces[..4].copy_from_slice(&[
                        face(Axis::I, [i, j, k]),
                        face(Axis::I, [i + 1, j, k]),
                        face(Axis::J, [i, j, k]),
                        face(Axis::J, [i, j + 1, k]),
                    ]);
                }
                conn.push((nodes, faces));
            }
        }
    }
    for (cell, (nodes, faces)) in blk.cells_mut().iter_mut().zip(conn) {
        cell.nodes = nodes;
        cell.faces = faces;
    }
}

/// Give frame edges and surfaces global ids and partner lists.
///
/// Two frame elements are the same physical entity when they carry the same
/// set of node classes.
fn color_frames(blocks: &mut [StructuredBlock], entries: &[InterfaceEntry]) -> Result<(usize, usize)> {
    let mut edge_keys: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut edge_groups: Vec<Vec<FrameRef>> = Vec::new();
    let mut surf_keys: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut surf_count = 0;

    for blk in blocks.iter_mut() {
        let index = blk.index();
        let mut edge_ids = Vec::with_capacity(blk.edges().len());
        for n in 1..=blk.edges().len() {
            let key = class_key(blk, blk.edge_nodes(n)?);
            let next = edge_keys.len() + 1;
            let id = *edge_keys.entry(key).or_insert(next);
            if id == next {
                edge_groups.push(Vec::new());
            }
            edge_groups[id - 1].push(FrameRef { block: index, local: n });
            edge_ids.push(id);
        }
        for (edge, id) in blk.edges_mut().iter_mut().zip(edge_ids) {
            edge.global = Some(id);
        }

        let mut surf_ids = Vec::with_capacity(blk.surfaces().len());
        for n in 1..=blk.surfaces().len() {
            let key = class_key(blk, blk.face_nodes(n)?);
            let next = surf_keys.len() + 1;
            let id = *surf_keys.entry(key).or_insert(next);
            surf_count = surf_count.max(id);
            surf_ids.push(id);
        }
        for (surf, id) in blk.surfaces_mut().iter_mut().zip(surf_ids) {
            surf.global = Some(id);
        }
    }

    for group in &edge_groups {
        for me in group {
            let partners: Vec<FrameRef> = group.iter().copied().filter(|r| r != me).collect();
            blocks[me.block - 1].edges_mut()[me.local - 1].partners = partners;
        }
    }

    for entry in entries {
        let Some(r2) = entry.range2() else {
            continue;
        };
        let r1 = entry.range1();
        let a = FrameRef { block: r1.block(), local: r1.face() };
        let b = FrameRef { block: r2.block(), local: r2.face() };
        if a == b {
            continue;
        }
        link_surfaces(blocks, a, b);
        link_surfaces(blocks, b, a);
    }

    Ok((edge_groups.len(), surf_count))
}

fn link_surfaces(blocks: &mut [StructuredBlock], at: FrameRef, partner: FrameRef) {
    if let Some(surf) = blocks[at.block - 1].surfaces_mut().get_mut(at.local - 1) {
        if !surf.partners.contains(&partner) {
            surf.partners.push(partner);
            surf.partners.sort_unstable();
        }
    }
}

/// Sorted, deduplicated node classes of `nodes`.
fn class_key(blk: &StructuredBlock, nodes: Vec<[usize; 3]>) -> Vec<usize> {
    let mut key: Vec<usize> = nodes
        .into_iter()
        .map(|ijk| blk.node_ids[blk.node_slot(ijk)])
        .collect();
    key.sort_unstable();
    key.dedup();
    key
}
