//! Corridor autotiling
//!
//! Each carved cell looks at its four neighbours, builds a connection mask and
//! maps it to a tile kind and a yaw. A neighbour connects when it is carved
//! too, or when it is a room cell holding a used door that opens back onto
//! this cell.

use std::collections::BTreeSet;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::grid::{Direction, GridPos, Occupancy};
use crate::rng::GameRng;
use crate::theme::TilePools;

bitflags! {
    /// Open sides of a corridor cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Connections: u8 {
        const NORTH = 0x01;
        const EAST = 0x02;
        const SOUTH = 0x04;
        const WEST = 0x08;
    }
}

impl Connections {
    pub const fn from_direction(dir: Direction) -> Self {
        match dir {
            Direction::North => Connections::NORTH,
            Direction::East => Connections::EAST,
            Direction::South => Connections::SOUTH,
            Direction::West => Connections::WEST,
        }
    }
}

/// Corridor tile archetypes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TileKind {
    Straight,
    Corner,
    TJunction,
    Cross,
    DeadEnd,
    /// Isolated cell with no open side
    FloorOnly,
}

/// Tile kind and yaw for a connection mask
///
/// Corners turn clockwise from north-east, T-junctions from their missing
/// south arm, dead ends point at their single opening.
pub fn classify(mask: Connections) -> (TileKind, f32) {
    match mask.bits() {
        15 => (TileKind::Cross, 0.0),
        5 => (TileKind::Straight, 0.0),
        10 => (TileKind::Straight, 90.0),
        3 => (TileKind::Corner, 0.0),
        6 => (TileKind::Corner, 90.0),
        12 => (TileKind::Corner, 180.0),
        9 => (TileKind::Corner, 270.0),
        11 => (TileKind::TJunction, 0.0),
        7 => (TileKind::TJunction, 90.0),
        14 => (TileKind::TJunction, 180.0),
        13 => (TileKind::TJunction, 270.0),
        1 => (TileKind::DeadEnd, 0.0),
        2 => (TileKind::DeadEnd, 90.0),
        4 => (TileKind::DeadEnd, 180.0),
        8 => (TileKind::DeadEnd, 270.0),
        // An isolated cell (mask 0) is floor only, not a dead end.
        _ => (TileKind::FloorOnly, 0.0),
    }
}

/// A used door as seen by the autotiler: the door cell and its exit direction
pub type OpenDoor = (GridPos, Direction);

/// Connection mask of the carved cell at `pos`
pub fn connections(pos: GridPos, occupancy: &Occupancy, used_doors: &BTreeSet<OpenDoor>) -> Connections {
    let mut mask = Connections::empty();
    for (dir, flag) in [
        (Direction::North, Connections::NORTH),
        (Direction::East, Connections::EAST),
        (Direction::South, Connections::SOUTH),
        (Direction::West, Connections::WEST),
    ] {
        let neighbour = pos.step(dir);
        let open = occupancy.is_corridor(neighbour)
            || (occupancy.is_room(neighbour) && used_doors.contains(&(neighbour, dir.opposite())));
        if open {
            mask |= flag;
        }
    }
    mask
}

/// One corridor tile of the finished layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorTile {
    pub position: GridPos,
    pub mask: Connections,
    pub kind: TileKind,
    pub yaw_degrees: f32,
    /// `None` when the theme has no prefab for this kind
    pub prefab: Option<String>,
}

/// Tile every carved cell, in grid order
pub fn autotile(
    occupancy: &Occupancy,
    used_doors: &BTreeSet<OpenDoor>,
    pools: &TilePools,
    rng: &mut GameRng,
) -> Vec<CorridorTile> {
    occupancy
        .corridor_cells()
        .map(|position| {
            let mask = connections(position, occupancy, used_doors);
            let (kind, yaw_degrees) = classify(mask);
            CorridorTile {
                position,
                mask,
                kind,
                yaw_degrees,
                prefab: pools.pick(kind, rng).map(str::to_owned),
            }
        })
        .collect()
}
