use serde::Serialize;

use crate::error::{NmfError, Result};

/// Dimensionality tag of a structured block, chosen once at construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Two,
    Three,
}

impl Dimension {
    /// Number of block faces (2D block faces are its bounding edges).
    pub fn face_count(self) -> usize {
        match self {
            Dimension::Two => 4,
            Dimension::Three => 6,
        }
    }

    pub fn edge_count(self) -> usize {
        match self {
            Dimension::Two => 4,
            Dimension::Three => 12,
        }
    }

    pub fn surface_count(self) -> usize {
        match self {
            Dimension::Two => 0,
            Dimension::Three => 6,
        }
    }
}

/// Structured index direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    I,
    J,
    K,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::I, Axis::J, Axis::K];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::I => 0,
            Axis::J => 1,
            Axis::K => 2,
        }
    }
}

/// Placement of one block face in index space.
///
/// The face holds `fixed` at 1 (or at its maximum when `at_max`), and is
/// parameterised by the `primary` and `secondary` axes of the neutral map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockFace {
    pub fixed: Axis,
    pub at_max: bool,
    pub primary: Axis,
    pub secondary: Axis,
}

const fn bf(fixed: Axis, at_max: bool, primary: Axis, secondary: Axis) -> BlockFace {
    BlockFace {
        fixed,
        at_max,
        primary,
        secondary,
    }
}

/// NMF face numbering of a hexahedral block.
const FACES_3D: [BlockFace; 6] = [
    bf(Axis::K, false, Axis::I, Axis::J),
    bf(Axis::K, true, Axis::I, Axis::J),
    bf(Axis::I, false, Axis::J, Axis::K),
    bf(Axis::I, true, Axis::J, Axis::K),
    bf(Axis::J, false, Axis::K, Axis::I),
    bf(Axis::J, true, Axis::K, Axis::I),
];

/// Face numbering of a quadrilateral block. The secondary axis is the
/// collapsed K direction, so secondary windows are always `1..1`.
const FACES_2D: [BlockFace; 4] = [
    bf(Axis::I, false, Axis::J, Axis::K),
    bf(Axis::I, true, Axis::J, Axis::K),
    bf(Axis::J, false, Axis::I, Axis::K),
    bf(Axis::J, true, Axis::I, Axis::K),
];

impl BlockFace {
    /// Structured `(i, j, k)` of the face point `(pri, sec)`.
    #[inline]
    pub fn point(&self, dims: [usize; 3], pri: usize, sec: usize) -> [usize; 3] {
        let mut ijk = [0usize; 3];
        let f = self.fixed.index();
        ijk[f] = if self.at_max { dims[f] } else { 1 };
        ijk[self.primary.index()] = pri;
        ijk[self.secondary.index()] = sec;
        ijk
    }

    /// Inverse of [`BlockFace::point`].
    #[inline]
    pub fn project(&self, ijk: [usize; 3]) -> (usize, usize) {
        (ijk[self.primary.index()], ijk[self.secondary.index()])
    }
}

/// Bound of a frame edge along one axis.
#[derive(Copy, Clone, Debug)]
enum Span {
    Lo,
    Hi,
    Run,
}

use Span::{Hi, Lo, Run};

/// Node lines of the twelve hexahedron edges.
const EDGE_LINES_3D: [[Span; 3]; 12] = [
    [Lo, Lo, Run],
    [Hi, Lo, Run],
    [Hi, Hi, Run],
    [Lo, Hi, Run],
    [Run, Lo, Lo],
    [Run, Lo, Hi],
    [Run, Hi, Hi],
    [Run, Hi, Lo],
    [Lo, Run, Lo],
    [Lo, Run, Hi],
    [Hi, Run, Hi],
    [Hi, Run, Lo],
];

/// Node lines of the four quadrilateral edges; same order as [`FACES_2D`].
const EDGE_LINES_2D: [[Span; 3]; 4] = [
    [Lo, Run, Lo],
    [Hi, Run, Lo],
    [Run, Lo, Lo],
    [Run, Hi, Lo],
];

/// Surfaces bounded by each edge of a hexahedron (1-based).
pub static EDGE_SURFACES: [[usize; 2]; 12] = [
    [3, 5],
    [5, 4],
    [4, 6],
    [6, 3],
    [1, 5],
    [5, 2],
    [2, 6],
    [6, 1],
    [1, 3],
    [3, 2],
    [2, 4],
    [4, 1],
];

/// Edges bounding each surface of a hexahedron (1-based).
pub static SURFACE_EDGES: [[usize; 4]; 6] = [
    [5, 9, 8, 12],
    [6, 11, 7, 10],
    [1, 10, 4, 9],
    [2, 12, 3, 11],
    [1, 5, 2, 6],
    [3, 8, 4, 7],
];

/// Stable address of a frame element: owning block and local index, both 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameRef {
    pub block: usize,
    pub local: usize,
}

/// One bounding edge of a block.
#[derive(Clone, Debug)]
pub struct Edge {
    local: usize,
    surfaces: &'static [usize],
    pub(crate) global: Option<usize>,
    pub(crate) partners: Vec<FrameRef>,
}

impl Edge {
    fn new(local: usize, surfaces: &'static [usize]) -> Self {
        Self {
            local,
            surfaces,
            global: None,
            partners: Vec::new(),
        }
    }

    pub fn local_index(&self) -> usize {
        self.local
    }

    /// Local surfaces this edge bounds (empty for 2D blocks).
    pub fn surfaces(&self) -> &[usize] {
        self.surfaces
    }

    /// Global frame-edge id, set by topology resolution.
    pub fn global_id(&self) -> Option<usize> {
        self.global
    }

    /// Edges on other blocks (or elsewhere on this block) identified with this one.
    pub fn partners(&self) -> &[FrameRef] {
        &self.partners
    }
}

/// One bounding surface of a 3D block.
#[derive(Clone, Debug)]
pub struct Surface {
    local: usize,
    edges: &'static [usize; 4],
    pub(crate) global: Option<usize>,
    pub(crate) partners: Vec<FrameRef>,
}

impl Surface {
    fn new(local: usize, edges: &'static [usize; 4]) -> Self {
        Self {
            local,
            edges,
            global: None,
            partners: Vec::new(),
        }
    }

    pub fn local_index(&self) -> usize {
        self.local
    }

    /// Local edges bounding this surface.
    pub fn edges(&self) -> &[usize; 4] {
        self.edges
    }

    pub fn global_id(&self) -> Option<usize> {
        self.global
    }

    /// Surfaces glued to this one by one-to-one interfaces.
    pub fn partners(&self) -> &[FrameRef] {
        &self.partners
    }
}

#[derive(Clone, Debug)]
enum Frame {
    Planar {
        edges: [Edge; 4],
    },
    Solid {
        edges: [Edge; 12],
        surfaces: [Surface; 6],
    },
}

impl Frame {
    fn new(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Two => Frame::Planar {
                edges: std::array::from_fn(|n| Edge::new(n + 1, &[])),
            },
            Dimension::Three => Frame::Solid {
                edges: std::array::from_fn(|n| Edge::new(n + 1, &EDGE_SURFACES[n])),
                surfaces: std::array::from_fn(|n| Surface::new(n + 1, &SURFACE_EDGES[n])),
            },
        }
    }

    fn edges(&self) -> &[Edge] {
        match self {
            Frame::Planar { edges } => edges,
            Frame::Solid { edges, .. } => edges,
        }
    }

    fn edges_mut(&mut self) -> &mut [Edge] {
        match self {
            Frame::Planar { edges } => edges,
            Frame::Solid { edges, .. } => edges,
        }
    }

    fn surfaces(&self) -> &[Surface] {
        match self {
            Frame::Planar { .. } => &[],
            Frame::Solid { surfaces, .. } => surfaces,
        }
    }

    fn surfaces_mut(&mut self) -> &mut [Surface] {
        match self {
            Frame::Planar { .. } => &mut [],
            Frame::Solid { surfaces, .. } => surfaces,
        }
    }
}

/// Cell shape tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CellShape {
    Quad,
    Hex,
}

impl CellShape {
    pub fn node_count(self) -> usize {
        match self {
            CellShape::Quad => 4,
            CellShape::Hex => 8,
        }
    }

    pub fn face_count(self) -> usize {
        match self {
            CellShape::Quad => 4,
            CellShape::Hex => 6,
        }
    }
}

/// Structured cell. Sequence, node and face numbers are global, 1-based,
/// and 0 until the owning map is resolved.
#[derive(Clone, Debug)]
pub struct Cell {
    shape: CellShape,
    pub(crate) seq: usize,
    pub(crate) nodes: [usize; 8],
    pub(crate) faces: [usize; 6],
}

impl Cell {
    fn new(shape: CellShape) -> Self {
        Self {
            shape,
            seq: 0,
            nodes: [0; 8],
            faces: [0; 6],
        }
    }

    pub fn shape(&self) -> CellShape {
        self.shape
    }

    /// Global cell sequence number.
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// Global node ids in local node order.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes[..self.shape.node_count()]
    }

    /// Global face ids in local face order.
    pub fn faces(&self) -> &[usize] {
        &self.faces[..self.shape.face_count()]
    }

    /// 1-based local node access.
    pub fn node(&self, n: usize) -> Result<usize> {
        let count = self.shape.node_count();
        check_range("cell node", n, 1, count)?;
        Ok(self.nodes[n - 1])
    }

    /// 1-based local face access.
    pub fn face(&self, n: usize) -> Result<usize> {
        let count = self.shape.face_count();
        check_range("cell face", n, 1, count)?;
        Ok(self.faces[n - 1])
    }
}

#[inline]
pub(crate) fn check_range(what: &'static str, index: usize, min: usize, max: usize) -> Result<()> {
    if index < min || index > max {
        return Err(NmfError::out_of_range(what, index, min, max));
    }
    Ok(())
}

/// A structured block of the neutral map: dimensions, cells and frame.
///
/// Terms follow the finite-volume convention: nodes are grid points, faces
/// are quads in 3D (segments in 2D), and cells are hexahedra (quads in 2D).
#[derive(Clone, Debug)]
pub struct StructuredBlock {
    index: usize,
    dims: [usize; 3],
    dimension: Dimension,
    cells: Vec<Cell>,
    frame: Frame,
    pub(crate) node_ids: Vec<usize>,
    pub(crate) face_ids: [Vec<usize>; 3],
}

impl StructuredBlock {
    /// Quadrilateral block with `ni × nj` nodes.
    pub fn new_2d(ni: usize, nj: usize) -> Result<Self> {
        if ni < 2 || nj < 2 {
            return Err(NmfError::InvalidDimension { i: ni, j: nj, k: 1 });
        }
        Self::build([ni, nj, 1], Dimension::Two)
    }

    /// Hexahedral block with `ni × nj × nk` nodes.
    pub fn new_3d(ni: usize, nj: usize, nk: usize) -> Result<Self> {
        if ni < 2 || nj < 2 || nk < 2 {
            return Err(NmfError::InvalidDimension {
                i: ni,
                j: nj,
                k: nk,
            });
        }
        Self::build([ni, nj, nk], Dimension::Three)
    }

    /// Block from a neutral-map dimension line; `nk == 1` selects 2D.
    pub fn from_dims(ni: usize, nj: usize, nk: usize) -> Result<Self> {
        if nk == 1 {
            Self::new_2d(ni, nj)
        } else {
            Self::new_3d(ni, nj, nk)
        }
    }

    fn build(dims: [usize; 3], dimension: Dimension) -> Result<Self> {
        let n_cells = checked_sizes(dims, dimension).ok_or(NmfError::InvalidDimension {
            i: dims[0],
            j: dims[1],
            k: dims[2],
        })?;
        let shape = match dimension {
            Dimension::Two => CellShape::Quad,
            Dimension::Three => CellShape::Hex,
        };
        Ok(Self {
            index: 0,
            dims,
            dimension,
            cells: vec![Cell::new(shape); n_cells],
            frame: Frame::new(dimension),
            node_ids: Vec::new(),
            face_ids: Default::default(),
        })
    }

    /// 1-based position in the owning map (0 while detached).
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn is_3d(&self) -> bool {
        self.dimension == Dimension::Three
    }

    pub fn idim(&self) -> usize {
        self.dims[0]
    }

    pub fn jdim(&self) -> usize {
        self.dims[1]
    }

    pub fn kdim(&self) -> usize {
        self.dims[2]
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn node_num(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn face_num(&self) -> usize {
        self.face_axes().map(|a| self.face_family_len(a)).sum()
    }

    pub fn cell_num(&self) -> usize {
        self.cell_extents().iter().product()
    }

    /// Cells per axis; the collapsed K axis of a 2D block counts as one layer.
    pub fn cell_extents(&self) -> [usize; 3] {
        cell_extents(self.dims, self.dimension)
    }

    /// Axes that carry a face family (faces normal to that axis).
    pub fn face_axes(&self) -> impl Iterator<Item = Axis> {
        let n = match self.dimension {
            Dimension::Two => 2,
            Dimension::Three => 3,
        };
        Axis::ALL.into_iter().take(n)
    }

    /// Extents of the face family normal to `axis`: nodes along `axis`,
    /// cells along the other two.
    pub(crate) fn face_family_dims(&self, axis: Axis) -> [usize; 3] {
        let mut ext = self.cell_extents();
        ext[axis.index()] = self.dims[axis.index()];
        ext
    }

    pub(crate) fn face_family_len(&self, axis: Axis) -> usize {
        self.face_family_dims(axis).iter().product()
    }

    /// Linear slot of the face normal to `axis` whose lower corner is `ijk`.
    #[inline]
    pub(crate) fn face_slot(&self, axis: Axis, ijk: [usize; 3]) -> usize {
        linear(self.face_family_dims(axis), ijk)
    }

    /// Linear slot of node `ijk`.
    #[inline]
    pub(crate) fn node_slot(&self, ijk: [usize; 3]) -> usize {
        linear(self.dims, ijk)
    }

    pub(crate) fn check_node(&self, ijk: [usize; 3]) -> Result<()> {
        check_range("node i", ijk[0], 1, self.dims[0])?;
        check_range("node j", ijk[1], 1, self.dims[1])?;
        check_range("node k", ijk[2], 1, self.dims[2])
    }

    fn cell_slot(&self, i: usize, j: usize, k: usize) -> Result<usize> {
        let ext = self.cell_extents();
        check_range("cell i", i, 1, ext[0])?;
        check_range("cell j", j, 1, ext[1])?;
        check_range("cell k", k, 1, ext[2])?;
        Ok(linear(ext, [i, j, k]))
    }

    /// 1-based cell access; `k` must be 1 for 2D blocks.
    pub fn cell(&self, i: usize, j: usize, k: usize) -> Result<&Cell> {
        let slot = self.cell_slot(i, j, k)?;
        Ok(&self.cells[slot])
    }

    pub fn cell_mut(&mut self, i: usize, j: usize, k: usize) -> Result<&mut Cell> {
        let slot = self.cell_slot(i, j, k)?;
        Ok(&mut self.cells[slot])
    }

    /// Cells in k-outermost, i-innermost order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Placement of 1-based block face `face`.
    pub fn block_face(&self, face: usize) -> Result<BlockFace> {
        check_range("face", face, 1, self.dimension.face_count())?;
        Ok(match self.dimension {
            Dimension::Two => FACES_2D[face - 1],
            Dimension::Three => FACES_3D[face - 1],
        })
    }

    /// Block face holding the faces normal to `axis` at its min/max end.
    pub(crate) fn face_number(&self, axis: Axis, at_max: bool) -> usize {
        let table: &[BlockFace] = match self.dimension {
            Dimension::Two => &FACES_2D,
            Dimension::Three => &FACES_3D,
        };
        table
            .iter()
            .position(|f| f.fixed == axis && f.at_max == at_max)
            .map_or(0, |p| p + 1)
    }

    /// Node counts `(primary, secondary)` of block face `face`.
    pub fn face_extent(&self, face: usize) -> Result<(usize, usize)> {
        let f = self.block_face(face)?;
        Ok((self.dims[f.primary.index()], self.dims[f.secondary.index()]))
    }

    /// Structured `(i, j, k)` of point `(pri, sec)` on block face `face`.
    pub fn face_point(&self, face: usize, pri: usize, sec: usize) -> Result<[usize; 3]> {
        let f = self.block_face(face)?;
        let ijk = f.point(self.dims, pri, sec);
        self.check_node(ijk)?;
        Ok(ijk)
    }

    /// 1-based frame edge.
    pub fn edge(&self, n: usize) -> Result<&Edge> {
        check_range("edge", n, 1, self.dimension.edge_count())?;
        Ok(&self.frame.edges()[n - 1])
    }

    /// 1-based frame surface (3D only).
    pub fn surface(&self, n: usize) -> Result<&Surface> {
        check_range("surface", n, 1, self.dimension.surface_count())?;
        Ok(&self.frame.surfaces()[n - 1])
    }

    pub fn edges(&self) -> &[Edge] {
        self.frame.edges()
    }

    pub fn surfaces(&self) -> &[Surface] {
        self.frame.surfaces()
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        self.frame.edges_mut()
    }

    pub(crate) fn surfaces_mut(&mut self) -> &mut [Surface] {
        self.frame.surfaces_mut()
    }

    /// Nodes along frame edge `n`, ascending along its running axis.
    pub fn edge_nodes(&self, n: usize) -> Result<Vec<[usize; 3]>> {
        check_range("edge", n, 1, self.dimension.edge_count())?;
        let line = match self.dimension {
            Dimension::Two => EDGE_LINES_2D[n - 1],
            Dimension::Three => EDGE_LINES_3D[n - 1],
        };
        let run = line
            .iter()
            .position(|s| matches!(s, Run))
            .unwrap_or_default();
        let mut base = [0usize; 3];
        for (a, span) in line.iter().enumerate() {
            base[a] = match span {
                Lo => 1,
                Hi => self.dims[a],
                Run => 0,
            };
        }
        Ok((1..=self.dims[run])
            .map(|v| {
                let mut ijk = base;
                ijk[run] = v;
                ijk
            })
            .collect())
    }

    /// Nodes of block face `face` in secondary-outer, primary-inner order.
    pub fn face_nodes(&self, face: usize) -> Result<Vec<[usize; 3]>> {
        let f = self.block_face(face)?;
        let (np, ns) = self.face_extent(face)?;
        let mut out = Vec::with_capacity(np * ns);
        for s in 1..=ns {
            for p in 1..=np {
                out.push(f.point(self.dims, p, s));
            }
        }
        Ok(out)
    }
}

fn cell_extents(dims: [usize; 3], dimension: Dimension) -> [usize; 3] {
    match dimension {
        Dimension::Two => [dims[0] - 1, dims[1] - 1, 1],
        Dimension::Three => [dims[0] - 1, dims[1] - 1, dims[2] - 1],
    }
}

/// Cell count of a block, or `None` when its node, cell or face storage
/// cannot be addressed.
fn checked_sizes(dims: [usize; 3], dimension: Dimension) -> Option<usize> {
    let product = |ext: [usize; 3]| ext.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
    let fits = |n: usize, width: usize| n.checked_mul(width).is_some_and(|b| b <= isize::MAX as usize);

    let nodes = product(dims)?;
    let cell_ext = cell_extents(dims, dimension);
    let cells = product(cell_ext)?;
    let axes = match dimension {
        Dimension::Two => 2,
        Dimension::Three => 3,
    };
    let mut faces = 0usize;
    for a in 0..axes {
        let mut ext = cell_ext;
        ext[a] = dims[a];
        faces = faces.checked_add(product(ext)?)?;
    }
    let id = std::mem::size_of::<usize>();
    (fits(nodes, id) && fits(faces, id) && fits(cells, std::mem::size_of::<Cell>())).then_some(cells)
}

/// 0-based i-fastest linear index of 1-based `ijk` inside `ext`.
#[inline]
fn linear(ext: [usize; 3], ijk: [usize; 3]) -> usize {
    ((ijk[2] - 1) * ext[1] + (ijk[1] - 1)) * ext[0] + (ijk[0] - 1)
}
