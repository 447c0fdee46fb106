pub mod bc;
pub mod block;
pub mod entry;
pub mod error;
pub mod grid;
pub mod model;
pub mod range;
pub mod read;
pub mod topology;
pub mod utils;
pub mod write;

pub use bc::BoundaryCondition;
pub use block::{Axis, BlockFace, Cell, CellShape, Dimension, Edge, FrameRef, StructuredBlock, Surface};
pub use entry::{map_window_point, InterfaceEntry, Side};
pub use error::{NmfError, Result};
pub use grid::{check_grid_dimensions, max_interface_gap, CoordinateProvider, GridBlock};
pub use model::NeutralMap;
pub use range::Range;
pub use read::{
    parse_neutral_map, parse_neutral_map_with, read_neutral_map, read_neutral_map_with,
    read_plot3d_ascii, read_plot3d_binary, BinaryFormat, FloatPrecision, ReadOptions,
};
pub use topology::{BlockSummary, DisjointSet, ResolvedMap, TopologySummary};
pub use utils::Endian;
pub use write::{neutral_map_to_string, write_neutral_map, write_neutral_map_to, write_plot3d};
