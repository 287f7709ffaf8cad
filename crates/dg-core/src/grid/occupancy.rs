//! Occupancy of a layer grid
//!
//! Tracks two disjoint sets: cells owned by a room footprint and cells carved
//! as corridor. Ordered collections keep iteration deterministic so a seed
//! always reproduces the same spawn order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{GridBounds, GridPos, GridRect};
use crate::room::RoomId;

/// What occupies a grid cell after placement and routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DungeonNode {
    /// Part of a room footprint
    Room(RoomId),
    /// Carved corridor; has no sockets and connects to any carved neighbour
    Corridor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupancy {
    bounds: GridBounds,
    #[serde(with = "cell_owners")]
    rooms: BTreeMap<GridPos, RoomId>,
    corridors: BTreeSet<GridPos>,
}

impl Occupancy {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            rooms: BTreeMap::new(),
            corridors: BTreeSet::new(),
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn is_room(&self, pos: GridPos) -> bool {
        self.rooms.contains_key(&pos)
    }

    pub fn is_corridor(&self, pos: GridPos) -> bool {
        self.corridors.contains(&pos)
    }

    /// The room owning this cell, if any
    pub fn room_at(&self, pos: GridPos) -> Option<RoomId> {
        self.rooms.get(&pos).copied()
    }

    pub fn node_at(&self, pos: GridPos) -> Option<DungeonNode> {
        if let Some(id) = self.room_at(pos) {
            Some(DungeonNode::Room(id))
        } else if self.is_corridor(pos) {
            Some(DungeonNode::Corridor)
        } else {
            None
        }
    }

    /// True when no cell of `rect` belongs to a room
    pub fn is_rect_free_of_rooms(&self, rect: &GridRect) -> bool {
        rect.cells().all(|pos| !self.is_room(pos))
    }

    /// Claim every cell of `rect` for `room`
    ///
    /// Returns the number of cells that already belonged to another room; the
    /// first owner is kept for those. A claimed corridor cell stops being a
    /// corridor so the two sets stay disjoint.
    pub fn mark_room(&mut self, rect: &GridRect, room: RoomId) -> usize {
        let mut collisions = 0;
        for pos in rect.cells() {
            if self.rooms.contains_key(&pos) {
                collisions += 1;
            } else {
                self.corridors.remove(&pos);
                self.rooms.insert(pos, room);
            }
        }
        collisions
    }

    /// Carve a corridor cell; refused for room cells and out-of-bounds cells
    pub fn carve(&mut self, pos: GridPos) -> bool {
        if self.is_room(pos) || !self.bounds.contains(pos) {
            return false;
        }
        self.corridors.insert(pos);
        true
    }

    pub fn corridor_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.corridors.iter().copied()
    }

    pub fn corridor_count(&self) -> usize {
        self.corridors.len()
    }

    pub fn room_cells(&self) -> impl Iterator<Item = (GridPos, RoomId)> + '_ {
        self.rooms.iter().map(|(pos, id)| (*pos, *id))
    }
}

/// Room cells as a list of `[pos, room]` pairs, since JSON keys must be strings
mod cell_owners {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::grid::GridPos;
    use crate::room::RoomId;

    pub fn serialize<S: Serializer>(map: &BTreeMap<GridPos, RoomId>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<GridPos, RoomId>, D::Error> {
        let pairs = Vec::<(GridPos, RoomId)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
