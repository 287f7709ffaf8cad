//! Door graph: candidate edges from a Delaunay triangulation, reduced to a
//! spanning forest with optional loops

pub mod delaunay;
pub mod reducer;

pub use delaunay::{delaunay_edges, door_edges, triangulate};
pub use reducer::{EdgeKind, RoomClusters, SelectedEdge, filter_edges, is_line_clear, line_cells, select_edges};
