//! Planning algorithms: the raster grid, the weighted graph, and the
//! roadmap that ties them together.

pub mod graph;
pub mod grid;
pub mod roadmap;

pub use graph::{Graph, VertexId};
pub use grid::Grid;
pub use roadmap::Roadmap;
