//! Grid model
//!
//! Cell coordinates, directions, rectangles and the per-layer occupancy sets.

mod cell;
mod occupancy;
mod rect;

pub use cell::{Direction, GridBounds, GridPos};
pub use occupancy::{DungeonNode, Occupancy};
pub use rect::GridRect;
