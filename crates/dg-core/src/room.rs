//! Room templates, placed room instances and their door sockets
//!
//! A template is an immutable module definition (footprint + door sockets).
//! An instance is a template placed at an origin with one of four quarter-turn
//! rotations. Door sockets are rotated into grid space with the same rule for
//! positions and directions so rooms and their doors never drift apart.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{Direction, GridPos, GridRect};

/// Index of a room instance within one layer's layout
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoomId(pub usize);

/// Index of a door node within one layer's layout
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DoorId(pub usize);

/// Number of clockwise quarter turns applied to a template (0..=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rotation(u8);

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation(0), Rotation(1), Rotation(2), Rotation(3)];

    /// Wraps any step count into 0..=3
    pub const fn new(steps: u8) -> Self {
        Self(steps % 4)
    }

    pub const fn steps(self) -> u8 {
        self.0
    }

    pub const fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }

    pub const fn degrees(self) -> f32 {
        self.0 as f32 * 90.0
    }
}

/// Rotate a template-local cell offset into the rotated footprint
///
/// `size` is the *unrotated* template size `(width, depth)`. The rule is
/// `(x,y) → (y, w-1-x) → (w-1-x, d-1-y) → (d-1-y, x)` for 0..=3 steps.
pub fn rotate_position(local: GridPos, size: (i32, i32), rotation: Rotation) -> GridPos {
    let (w, d) = size;
    let GridPos { x, y } = local;
    match rotation.steps() {
        0 => GridPos::new(x, y),
        1 => GridPos::new(y, w - 1 - x),
        2 => GridPos::new(w - 1 - x, d - 1 - y),
        _ => GridPos::new(d - 1 - y, x),
    }
}

/// Rotate a direction: `(dx,dy) → (dy,-dx) → (-dx,-dy) → (-dy,dx)`
pub fn rotate_direction(dir: Direction, rotation: Rotation) -> Direction {
    let GridPos { x: dx, y: dy } = dir.offset();
    let rotated = match rotation.steps() {
        0 => GridPos::new(dx, dy),
        1 => GridPos::new(dy, -dx),
        2 => GridPos::new(-dx, -dy),
        _ => GridPos::new(-dy, dx),
    };
    // A quarter turn of a unit offset is always a unit offset.
    Direction::from_offset(rotated).unwrap_or(dir)
}

/// Size of a `(width, depth)` footprint after rotation
pub fn rotated_size(size: (i32, i32), rotation: Rotation) -> (i32, i32) {
    if rotation.is_odd() {
        (size.1, size.0)
    } else {
        size
    }
}

/// A door socket on a template, in template-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorDef {
    /// Cell inside the footprint that holds the door; (0,0) is the bottom-left cell
    pub position: GridPos,
    /// Direction a corridor leaves the room through this door
    pub direction: Direction,
    /// Layer of the door relative to the room's base layer (-1, 0 or +1)
    #[serde(default)]
    pub layer_offset: i32,
}

/// Immutable room module definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub name: String,
    /// Asset key passed to the scene when the room is spawned
    pub prefab: String,
    pub width: i32,
    pub depth: i32,
    #[serde(default)]
    pub doors: Vec<DoorDef>,
    /// Footprint must also be reserved on the layer above
    #[serde(default)]
    pub occupies_layer_above: bool,
    /// Footprint must also be reserved on the layer below
    #[serde(default)]
    pub occupies_layer_below: bool,
}

impl RoomTemplate {
    pub fn new(name: impl Into<String>, prefab: impl Into<String>, width: i32, depth: i32) -> Self {
        Self {
            name: name.into(),
            prefab: prefab.into(),
            width,
            depth,
            doors: Vec::new(),
            occupies_layer_above: false,
            occupies_layer_below: false,
        }
    }

    /// Builder: add a door on the template's own layer
    pub fn with_door(self, x: i32, y: i32, direction: Direction) -> Self {
        self.with_layer_door(x, y, direction, 0)
    }

    /// Builder: add a door on a layer relative to the template's base layer
    pub fn with_layer_door(mut self, x: i32, y: i32, direction: Direction, layer_offset: i32) -> Self {
        self.doors.push(DoorDef {
            position: GridPos::new(x, y),
            direction,
            layer_offset,
        });
        self
    }

    pub fn occupying_layer_above(mut self) -> Self {
        self.occupies_layer_above = true;
        self
    }

    pub fn occupying_layer_below(mut self) -> Self {
        self.occupies_layer_below = true;
        self
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.depth)
    }

    /// Single-door, single-layer modules can terminate an unused socket
    pub fn is_cap_candidate(&self) -> bool {
        self.doors.len() == 1
            && self.doors[0].layer_offset == 0
            && !self.occupies_layer_above
            && !self.occupies_layer_below
    }

    /// Check the footprint and every door socket
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidTemplate {
            name: self.name.clone(),
            reason,
        };

        if self.width < 1 || self.depth < 1 {
            return Err(invalid(format!(
                "footprint must be at least 1x1, got {}x{}",
                self.width, self.depth
            )));
        }

        let footprint = GridRect::from_origin(GridPos::default(), self.width, self.depth);
        for door in &self.doors {
            if !footprint.contains_pos(door.position) {
                return Err(invalid(format!(
                    "door at {} lies outside the {}x{} footprint",
                    door.position, self.width, self.depth
                )));
            }
            if footprint.contains_pos(door.position.step(door.direction)) {
                return Err(invalid(format!(
                    "door at {} faces {} into its own footprint",
                    door.position, door.direction
                )));
            }
            if !(-1..=1).contains(&door.layer_offset) {
                return Err(invalid(format!(
                    "door at {} has layer offset {}, expected -1, 0 or 1",
                    door.position, door.layer_offset
                )));
            }
        }
        Ok(())
    }
}

/// How a room instance came to be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomSource {
    /// Supplied up front (including ghost projections)
    Fixed,
    /// A theme's mandatory template
    Mandatory,
    /// Drawn from the weighted pool
    Pool,
    /// Terminates an otherwise unused socket
    Cap,
}

/// A template placed on a layer grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInstance {
    pub id: RoomId,
    pub template: Arc<RoomTemplate>,
    pub origin: GridPos,
    pub rotation: Rotation,
    /// Reserves footprint only: never spawned, never blocks line of sight
    pub ghost: bool,
    /// Layer the room was generated on; door layer offsets are relative to it
    pub base_layer: i32,
    pub source: RoomSource,
}

impl RoomInstance {
    /// Rotated `(width, depth)`
    pub fn size(&self) -> (i32, i32) {
        rotated_size(self.template.size(), self.rotation)
    }

    pub fn footprint(&self) -> GridRect {
        let (w, d) = self.size();
        GridRect::from_origin(self.origin, w, d)
    }

    /// Door sockets that sit on `target_layer`, in grid space
    pub fn door_nodes(&self, target_layer: i32) -> Vec<(GridPos, Direction)> {
        let size = self.template.size();
        self.template
            .doors
            .iter()
            .filter(|door| self.base_layer + door.layer_offset == target_layer)
            .map(|door| {
                let offset = rotate_position(door.position, size, self.rotation);
                (
                    self.origin + offset,
                    rotate_direction(door.direction, self.rotation),
                )
            })
            .collect()
    }
}

/// One door of one room instance, in grid space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorNode {
    pub id: DoorId,
    pub room: RoomId,
    pub position: GridPos,
    pub direction: Direction,
}

impl DoorNode {
    /// The open cell just outside the door, where a corridor must arrive
    pub fn entry_tile(&self) -> GridPos {
        self.position.step(self.direction)
    }
}

/// Candidate or accepted connection between two door nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorEdge {
    pub a: DoorId,
    pub b: DoorId,
    /// Euclidean distance between the two door cells
    pub distance: f64,
}

impl DoorEdge {
    pub fn between(a: &DoorNode, b: &DoorNode) -> Self {
        Self {
            a: a.id,
            b: b.id,
            distance: a.position.distance(b.position),
        }
    }

    /// Order-independent identity of the edge
    pub fn key(&self) -> (DoorId, DoorId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}
