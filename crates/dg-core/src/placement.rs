//! Room placement
//!
//! Rooms go down in three passes: fixed rooms (including ghost footprints
//! projected from another layer), the theme's mandatory templates, then
//! weighted draws from the random pool until the budget is spent. Every
//! random placement keeps a one-cell halo of empty cells around the room so
//! corridors can always reach its walls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::grid::{GridPos, GridRect, Occupancy};
use crate::report::{GenerationReport, GenerationWarning};
use crate::rng::GameRng;
use crate::room::{RoomId, RoomInstance, RoomSource, RoomTemplate, Rotation, rotated_size};
use crate::theme::Theme;

/// A room supplied up front instead of being placed randomly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedRoom {
    pub template: Arc<RoomTemplate>,
    pub origin: GridPos,
    pub rotation: Rotation,
    /// Reserve the footprint without spawning anything
    pub ghost: bool,
    /// Layer whose door offsets the room is expressed against
    pub base_layer: i32,
}

impl FixedRoom {
    pub fn new(template: Arc<RoomTemplate>, origin: GridPos, rotation: Rotation, base_layer: i32) -> Self {
        Self {
            template,
            origin,
            rotation,
            ghost: false,
            base_layer,
        }
    }

    /// Projection of a room living on another layer
    pub fn ghost_of(room: &RoomInstance) -> Self {
        Self {
            template: Arc::clone(&room.template),
            origin: room.origin,
            rotation: room.rotation,
            ghost: true,
            base_layer: room.base_layer,
        }
    }
}

/// Room instances of one layer together with their occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSet {
    pub rooms: Vec<RoomInstance>,
    pub occupancy: Occupancy,
}

impl RoomSet {
    pub fn new(occupancy: Occupancy) -> Self {
        Self {
            rooms: Vec::new(),
            occupancy,
        }
    }

    pub fn room(&self, id: RoomId) -> Option<&RoomInstance> {
        self.rooms.get(id.0)
    }

    /// Register a room and claim its footprint
    ///
    /// Returns the new id and the number of cells that were already taken.
    pub fn insert(
        &mut self,
        template: Arc<RoomTemplate>,
        origin: GridPos,
        rotation: Rotation,
        ghost: bool,
        base_layer: i32,
        source: RoomSource,
    ) -> (RoomId, usize) {
        let id = RoomId(self.rooms.len());
        let room = RoomInstance {
            id,
            template,
            origin,
            rotation,
            ghost,
            base_layer,
            source,
        };
        let collisions = self.occupancy.mark_room(&room.footprint(), id);
        self.rooms.push(room);
        (id, collisions)
    }

    /// Try random rotations and origins until the room fits with its halo
    pub fn try_place(
        &mut self,
        template: &Arc<RoomTemplate>,
        source: RoomSource,
        layer: i32,
        max_attempts: u32,
        rng: &mut GameRng,
    ) -> Option<RoomId> {
        let bounds = self.occupancy.bounds();
        for _ in 0..max_attempts {
            let rotation = Rotation::new(rng.below(4) as u8);
            let (w, d) = rotated_size(template.size(), rotation);
            let Some(x) = rng.range_inclusive(1, bounds.width - w - 1) else {
                continue;
            };
            let Some(y) = rng.range_inclusive(1, bounds.height - d - 1) else {
                continue;
            };
            let origin = GridPos::new(x, y);
            let footprint = GridRect::from_origin(origin, w, d);
            if self.occupancy.is_rect_free_of_rooms(&footprint.expanded(1)) {
                let (id, _) = self.insert(Arc::clone(template), origin, rotation, false, layer, source);
                return Some(id);
            }
        }
        None
    }

    pub fn real_rooms(&self) -> impl Iterator<Item = &RoomInstance> {
        self.rooms.iter().filter(|r| !r.ghost)
    }
}

/// Run all three placement passes for one layer
pub fn place_rooms(
    config: &GeneratorConfig,
    theme: &Theme,
    fixed: &[FixedRoom],
    layer: i32,
    rng: &mut GameRng,
    report: &mut GenerationReport,
) -> RoomSet {
    let mut set = RoomSet::new(Occupancy::new(config.bounds()));

    for room in fixed {
        let (_, collisions) = set.insert(
            Arc::clone(&room.template),
            room.origin,
            room.rotation,
            room.ghost,
            room.base_layer,
            RoomSource::Fixed,
        );
        if collisions > 0 {
            warn!(template = %room.template.name, collisions, "fixed room overlaps occupied cells");
            report.warnings.push(GenerationWarning::FixedRoomOverlap {
                template: room.template.name.clone(),
                cells: collisions,
            });
        }
    }

    for template in &theme.mandatory {
        let placed = set.try_place(
            template,
            RoomSource::Mandatory,
            layer,
            config.max_placement_attempts,
            rng,
        );
        if placed.is_none() {
            warn!(template = %template.name, "mandatory room could not be placed");
            report.warnings.push(GenerationWarning::MandatoryPlacementFailed {
                template: template.name.clone(),
                attempts: config.max_placement_attempts,
            });
        }
    }

    let budget = random_budget(config, theme, fixed);
    for _ in 0..budget {
        let Some(template) = theme.pick_room(rng) else {
            break;
        };
        let placed = set.try_place(
            &template,
            RoomSource::Pool,
            layer,
            config.max_placement_attempts,
            rng,
        );
        if placed.is_none() {
            debug!(template = %template.name, "pool room did not fit");
        }
    }

    report.rooms_requested = fixed_real(fixed) + theme.mandatory.len() + budget;
    debug!(
        layer,
        placed = set.rooms.len(),
        budget,
        "room placement finished"
    );
    set
}

/// Random draws left after fixed and mandatory rooms, never negative
pub fn random_budget(config: &GeneratorConfig, theme: &Theme, fixed: &[FixedRoom]) -> usize {
    config
        .target_room_count
        .saturating_sub(fixed_real(fixed))
        .saturating_sub(theme.mandatory.len())
}

fn fixed_real(fixed: &[FixedRoom]) -> usize {
    fixed.iter().filter(|f| !f.ghost).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, GridBounds};

    fn hall() -> RoomTemplate {
        RoomTemplate::new("hall", "Rooms/Hall", 3, 2)
            .with_door(1, 0, Direction::South)
            .with_door(2, 1, Direction::East)
    }

    fn config(width: i32, height: i32, target: usize) -> GeneratorConfig {
        GeneratorConfig {
            grid_width: width,
            grid_height: height,
            target_room_count: target,
            ..Default::default()
        }
    }

    #[test]
    fn test_random_rooms_keep_halo() {
        let theme = Theme::new("t").with_room(hall(), 1);
        let mut rng = GameRng::new(5);
        let mut report = GenerationReport::new(0, 5);
        let set = place_rooms(&config(40, 40, 12), &theme, &[], 0, &mut rng, &mut report);

        assert!(!set.rooms.is_empty());
        for a in &set.rooms {
            let bounds = GridBounds::new(40, 40);
            let halo = a.footprint().expanded(1);
            assert!(bounds.contains(GridPos::new(halo.lx, halo.ly)));
            assert!(bounds.contains(GridPos::new(halo.hx, halo.hy)));
            for b in &set.rooms {
                if a.id != b.id {
                    assert!(!halo.intersects(&b.footprint()), "{:?} touches {:?}", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn test_budget_subtracts_fixed_and_mandatory() {
        let theme = Theme::new("t").with_room(hall(), 1).with_mandatory(hall());
        let template = Arc::new(hall());
        let fixed = vec![
            FixedRoom::new(Arc::clone(&template), GridPos::new(2, 2), Rotation::default(), 0),
            FixedRoom {
                ghost: true,
                ..FixedRoom::new(template, GridPos::new(10, 10), Rotation::default(), 0)
            },
        ];
        assert_eq!(random_budget(&config(30, 30, 5), &theme, &fixed), 3);
        assert_eq!(random_budget(&config(30, 30, 1), &theme, &fixed), 0);
    }

    #[test]
    fn test_oversized_mandatory_is_reported() {
        let huge = RoomTemplate::new("vault", "Rooms/Vault", 9, 9);
        let theme = Theme::new("t").with_mandatory(huge);
        let mut rng = GameRng::new(1);
        let mut report = GenerationReport::new(0, 1);
        let set = place_rooms(&config(8, 8, 0), &theme, &[], 0, &mut rng, &mut report);
        assert!(set.rooms.is_empty());
        assert!(!report.is_complete());
    }

    #[test]
    fn test_fixed_rooms_are_registered_even_when_overlapping() {
        let template = Arc::new(hall());
        let fixed = vec![
            FixedRoom::new(Arc::clone(&template), GridPos::new(2, 2), Rotation::default(), 0),
            FixedRoom::new(template, GridPos::new(3, 2), Rotation::default(), 0),
        ];
        let mut rng = GameRng::new(1);
        let mut report = GenerationReport::new(0, 1);
        let set = place_rooms(&config(20, 20, 0), &Theme::new("t"), &fixed, 0, &mut rng, &mut report);
        assert_eq!(set.rooms.len(), 2);
        assert!(matches!(
            report.warnings.as_slice(),
            [GenerationWarning::FixedRoomOverlap { cells: 4, .. }]
        ));
    }

    #[test]
    fn test_ghost_blocks_placement() {
        // A ghost covering almost the whole grid leaves no room for anything.
        let blocker = Arc::new(RoomTemplate::new("shaft", "Rooms/Shaft", 10, 10));
        let fixed = vec![FixedRoom {
            ghost: true,
            ..FixedRoom::new(blocker, GridPos::new(1, 1), Rotation::default(), 0)
        }];
        let theme = Theme::new("t").with_room(RoomTemplate::new("cell", "Rooms/Cell", 1, 1), 1);
        let mut rng = GameRng::new(3);
        let mut report = GenerationReport::new(1, 3);
        let set = place_rooms(&config(12, 12, 4), &theme, &fixed, 1, &mut rng, &mut report);
        assert_eq!(set.rooms.len(), 1);
        assert!(set.rooms[0].ghost);
        assert_eq!(set.real_rooms().count(), 0);
    }
}
