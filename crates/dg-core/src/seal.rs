//! Sealing of doors that never received a corridor
//!
//! An unused door is first offered a cap room (a small single-door module
//! plugged straight onto the socket) with probability `cap_room_chance`. When
//! no cap room is tried or none fits, a blocker seal is recorded in front of
//! the door instead.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{Direction, GridPos, GridRect};
use crate::placement::RoomSet;
use crate::rng::GameRng;
use crate::room::{
    DoorId, DoorNode, RoomId, RoomSource, RoomTemplate, Rotation, rotate_direction, rotate_position,
    rotated_size,
};
use crate::theme::Theme;

/// Blocker prop in front of an unused door
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealPlacement {
    pub door: DoorId,
    /// The door cell; the blocker sits half a cell further along `direction`
    pub position: GridPos,
    /// Exit direction of the door, which the blocker faces
    pub direction: Direction,
    /// `None` when the theme has no blocker prefab
    pub prefab: Option<String>,
}

/// Result of the sealing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SealOutcome {
    pub seals: Vec<SealPlacement>,
    /// `(socket door, cap room door)` pairs
    pub cap_links: Vec<(DoorId, DoorId)>,
}

/// Seal or cap every door not in `used`
///
/// Cap rooms are added to `rooms`, their doors to `nodes`, and both doors of
/// a cap link are marked used.
pub fn seal_doors(
    rooms: &mut RoomSet,
    nodes: &mut Vec<DoorNode>,
    used: &mut BTreeSet<DoorId>,
    theme: &Theme,
    cap_room_chance: f64,
    layer: i32,
    rng: &mut GameRng,
) -> SealOutcome {
    let caps = theme.cap_templates();
    let mut outcome = SealOutcome::default();
    let mut sealed: BTreeSet<(GridPos, Direction)> = BTreeSet::new();

    let socket_count = nodes.len();
    for index in 0..socket_count {
        let socket = nodes[index];
        if used.contains(&socket.id) {
            continue;
        }

        if !caps.is_empty() && rng.chance(cap_room_chance) {
            if let Some(template) = rng.choose(&caps) {
                let template = Arc::clone(template);
                if let Some(cap_door) = try_place_cap(rooms, nodes, &socket, template, layer) {
                    used.insert(socket.id);
                    used.insert(cap_door);
                    outcome.cap_links.push((socket.id, cap_door));
                    debug!(door = socket.id.0, "cap room placed");
                    continue;
                }
            }
        }

        if sealed.insert((socket.position, socket.direction)) {
            outcome.seals.push(SealPlacement {
                door: socket.id,
                position: socket.position,
                direction: socket.direction,
                prefab: theme.blocked_door.clone(),
            });
        }
    }

    debug!(
        seals = outcome.seals.len(),
        caps = outcome.cap_links.len(),
        "sealing finished"
    );
    outcome
}

/// Rotation that turns the template's single door to face `facing`
fn rotation_facing(template: &RoomTemplate, facing: Direction) -> Option<Rotation> {
    let door = template.doors.first()?;
    Rotation::ALL
        .into_iter()
        .find(|&r| rotate_direction(door.direction, r) == facing)
}

/// Plug `template` onto `socket`; returns the new door's id on success
fn try_place_cap(
    rooms: &mut RoomSet,
    nodes: &mut Vec<DoorNode>,
    socket: &DoorNode,
    template: Arc<RoomTemplate>,
    layer: i32,
) -> Option<DoorId> {
    let entry = socket.entry_tile();
    let rotation = rotation_facing(&template, socket.direction.opposite())?;
    let door = template.doors.first()?;
    let local = rotate_position(door.position, template.size(), rotation);
    let origin = entry - local;
    let (w, d) = rotated_size(template.size(), rotation);
    let footprint = GridRect::from_origin(origin, w, d);

    if !fits(rooms, nodes, socket, &footprint) {
        return None;
    }

    let (room, _) = rooms.insert(template, origin, rotation, false, layer, RoomSource::Cap);
    let id = DoorId(nodes.len());
    nodes.push(DoorNode {
        id,
        room,
        position: entry,
        direction: socket.direction.opposite(),
    });
    Some(id)
}

fn fits(rooms: &RoomSet, nodes: &[DoorNode], socket: &DoorNode, footprint: &GridRect) -> bool {
    let occupancy = &rooms.occupancy;
    if !occupancy.bounds().rect().contains(footprint) {
        return false;
    }

    let clear = footprint
        .cells()
        .all(|pos| occupancy.node_at(pos).is_none());
    if !clear {
        return false;
    }

    let blocks_other_door = nodes
        .iter()
        .any(|n| n.id != socket.id && footprint.contains_pos(n.entry_tile()));
    if blocks_other_door {
        return false;
    }

    let owner: RoomId = socket.room;
    footprint
        .expanded(1)
        .cells()
        .all(|pos| occupancy.room_at(pos).is_none_or(|r| r == owner))
}
