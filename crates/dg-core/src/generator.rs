//! Layer generation pipeline
//!
//! `generate_layer` is pure: it validates its inputs, then runs placement,
//! door graph, triangulation, reduction, routing, autotiling and sealing, and
//! returns a [`LayerLayout`]. Nothing touches a scene until the layout is
//! complete, so a configuration error never leaves a half-cleared scene.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::autotile::{CorridorTile, OpenDoor, autotile};
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::graph::{EdgeKind, SelectedEdge, door_edges, filter_edges, select_edges};
use crate::grid::{GridBounds, Occupancy};
use crate::placement::{FixedRoom, RoomSet, place_rooms, random_budget};
use crate::report::{GenerationReport, GenerationWarning};
use crate::rng::GameRng;
use crate::room::{DoorEdge, DoorId, DoorNode, RoomInstance};
use crate::router::{CorridorPath, RouteCosts, carve_path, find_path};
use crate::scene::{Scene, SpawnHandle, SpawnKind, SpawnRequest, Transform, Vec3};
use crate::seal::{SealPlacement, seal_doors};
use crate::theme::Theme;

/// Layers the stack coordinator knows how to build
pub const SUPPORTED_LAYERS: std::ops::RangeInclusive<i32> = -1..=1;

/// Everything one layer run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerLayout {
    pub layer: i32,
    pub bounds: GridBounds,
    pub rooms: Vec<RoomInstance>,
    pub occupancy: Occupancy,
    pub doors: Vec<DoorNode>,
    pub candidate_edges: Vec<DoorEdge>,
    pub edges: Vec<SelectedEdge>,
    pub corridors: Vec<CorridorPath>,
    pub used_doors: BTreeSet<DoorId>,
    pub tiles: Vec<CorridorTile>,
    pub seals: Vec<SealPlacement>,
    /// `(socket door, cap room door)` pairs
    pub cap_links: Vec<(DoorId, DoorId)>,
    pub report: GenerationReport,
}

/// Check every input of a layer run without mutating anything
pub fn validate_inputs(
    config: &GeneratorConfig,
    theme: &Theme,
    fixed: &[FixedRoom],
    layer: i32,
) -> Result<(), GenerationError> {
    if !SUPPORTED_LAYERS.contains(&layer) {
        return Err(GenerationError::UnsupportedLayer(layer));
    }
    config.validate()?;
    theme.validate()?;
    for room in fixed {
        room.template.validate()?;
    }
    theme.check_room_budget(random_budget(config, theme, fixed))?;
    Ok(())
}

/// Door nodes of every room on `layer`, with ids in room order
pub fn collect_door_nodes(rooms: &[RoomInstance], layer: i32) -> Vec<DoorNode> {
    let mut nodes = Vec::new();
    for room in rooms {
        for (position, direction) in room.door_nodes(layer) {
            nodes.push(DoorNode {
                id: DoorId(nodes.len()),
                room: room.id,
                position,
                direction,
            });
        }
    }
    nodes
}

/// Generate one layer
pub fn generate_layer(
    config: &GeneratorConfig,
    theme: &Theme,
    fixed: &[FixedRoom],
    layer: i32,
    rng: &mut GameRng,
) -> Result<LayerLayout, GenerationError> {
    validate_inputs(config, theme, fixed, layer)?;

    let mut report = GenerationReport::new(layer, rng.seed());
    let mut rooms = place_rooms(config, theme, fixed, layer, rng, &mut report);

    let mut doors = collect_door_nodes(&rooms.rooms, layer);
    report.door_nodes = doors.len();

    let candidate_edges = door_edges(&doors);
    let filtered = filter_edges(&candidate_edges, &doors, &rooms);
    let edges = select_edges(&filtered, &doors, rooms.rooms.len(), config.loop_chance, rng);
    report.candidate_edges = candidate_edges.len();
    report.filtered_edges = filtered.len();
    report.spanning_edges = edges.iter().filter(|e| e.kind == EdgeKind::Spanning).count();
    report.loop_edges = edges.iter().filter(|e| e.kind == EdgeKind::Loop).count();
    debug!(
        layer,
        doors = doors.len(),
        candidates = candidate_edges.len(),
        filtered = filtered.len(),
        "door graph built"
    );

    let mut used_doors = BTreeSet::new();
    let corridors = route_edges(config, &edges, &doors, &mut rooms, &mut used_doors, &mut report);

    let open_doors: BTreeSet<OpenDoor> = used_doors
        .iter()
        .map(|id| (doors[id.0].position, doors[id.0].direction))
        .collect();
    let tiles = autotile(&rooms.occupancy, &open_doors, &theme.tiles, rng);

    let outcome = seal_doors(
        &mut rooms,
        &mut doors,
        &mut used_doors,
        theme,
        config.cap_room_chance,
        layer,
        rng,
    );

    report.rooms_placed = rooms.real_rooms().count();
    report.ghost_rooms = rooms.rooms.len() - report.rooms_placed;
    report.cap_rooms = outcome.cap_links.len();
    report.corridor_cells = rooms.occupancy.corridor_count();
    report.sealed_doors = outcome.seals.len();

    info!(
        layer,
        seed = report.seed,
        rooms = report.rooms_placed,
        corridors = report.routed_edges,
        cells = report.corridor_cells,
        sealed = report.sealed_doors,
        "layer generated"
    );

    let RoomSet { rooms, occupancy } = rooms;
    Ok(LayerLayout {
        layer,
        bounds: config.bounds(),
        rooms,
        occupancy,
        doors,
        candidate_edges,
        edges,
        corridors,
        used_doors,
        tiles,
        seals: outcome.seals,
        cap_links: outcome.cap_links,
        report,
    })
}

fn route_edges(
    config: &GeneratorConfig,
    edges: &[SelectedEdge],
    doors: &[DoorNode],
    rooms: &mut RoomSet,
    used: &mut BTreeSet<DoorId>,
    report: &mut GenerationReport,
) -> Vec<CorridorPath> {
    let costs = RouteCosts::from(config);
    let bounds = rooms.occupancy.bounds();
    let mut corridors = Vec::new();

    for selected in edges {
        let (a, b) = (&doors[selected.edge.a.0], &doors[selected.edge.b.0]);
        let (start, goal) = (a.entry_tile(), b.entry_tile());

        if let Some(door) = [a, b].into_iter().find(|d| !bounds.contains(d.entry_tile())) {
            debug!(door = door.id.0, "entry tile outside the grid, edge skipped");
            report.warnings.push(GenerationWarning::EntryOutOfBounds {
                door: door.id,
                entry: door.entry_tile(),
            });
            continue;
        }

        match find_path(&rooms.occupancy, start, goal, &costs) {
            Some(path) => {
                carve_path(&mut rooms.occupancy, &path);
                used.insert(a.id);
                used.insert(b.id);
                report.routed_edges += 1;
                corridors.push(path);
            }
            None => {
                warn!(from = a.id.0, to = b.id.0, "no corridor route");
                report.failed_routes += 1;
                report.warnings.push(GenerationWarning::RouteFailed { from: a.id, to: b.id });
            }
        }
    }
    corridors
}

impl LayerLayout {
    /// Spawn every visible piece of the layout; ghost rooms are skipped
    pub fn spawn_into<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        unit_size: f32,
        elevation: f32,
    ) -> Vec<SpawnHandle> {
        let mut handles = Vec::new();

        for room in self.rooms.iter().filter(|r| !r.ghost) {
            handles.push(scene.spawn(&SpawnRequest {
                prefab: room.template.prefab.clone(),
                transform: room_transform(room, unit_size, elevation),
                kind: SpawnKind::Room,
            }));
        }

        for tile in &self.tiles {
            let Some(prefab) = &tile.prefab else {
                continue;
            };
            handles.push(scene.spawn(&SpawnRequest {
                prefab: prefab.clone(),
                transform: Transform {
                    position: cell_centre(tile.position.x as f32, tile.position.y as f32, unit_size, elevation),
                    yaw_degrees: tile.yaw_degrees,
                },
                kind: SpawnKind::Corridor,
            }));
        }

        for seal in &self.seals {
            let Some(prefab) = &seal.prefab else {
                continue;
            };
            let offset = seal.direction.offset();
            let x = seal.position.x as f32 + 0.5 * offset.x as f32;
            let y = seal.position.y as f32 + 0.5 * offset.y as f32;
            handles.push(scene.spawn(&SpawnRequest {
                prefab: prefab.clone(),
                transform: Transform {
                    position: cell_centre(x, y, unit_size, elevation),
                    yaw_degrees: seal.direction.yaw_degrees(),
                },
                kind: SpawnKind::Seal,
            }));
        }

        handles
    }
}

fn cell_centre(x: f32, y: f32, unit_size: f32, elevation: f32) -> Vec3 {
    Vec3::new((x + 0.5) * unit_size, elevation, (y + 0.5) * unit_size)
}

/// World transform of a room prefab whose pivot is its unrotated (0,0) corner
pub fn room_transform(room: &RoomInstance, unit_size: f32, elevation: f32) -> Transform {
    let (w, d) = (room.template.width as f32, room.template.depth as f32);
    let (px, pz) = match room.rotation.steps() {
        0 => (0.0, 0.0),
        1 => (0.0, w),
        2 => (w, d),
        _ => (d, 0.0),
    };
    Transform {
        position: Vec3::new(
            (room.origin.x as f32 + px) * unit_size,
            elevation,
            (room.origin.y as f32 + pz) * unit_size,
        ),
        yaw_degrees: room.rotation.degrees(),
    }
}

/// Single-layer generator with manual generate and clear entry points
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    config: GeneratorConfig,
    theme: Theme,
    fixed: Vec<FixedRoom>,
    spawned: Vec<SpawnHandle>,
}

impl DungeonGenerator {
    pub fn new(config: GeneratorConfig, theme: Theme) -> Self {
        Self {
            config,
            theme,
            fixed: Vec::new(),
            spawned: Vec::new(),
        }
    }

    /// Rooms placed before any random placement on every run
    pub fn with_fixed_rooms(mut self, fixed: Vec<FixedRoom>) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Handles of everything the last run spawned
    pub fn spawned(&self) -> &[SpawnHandle] {
        &self.spawned
    }

    /// Tear down the previous run, generate layer 0 and spawn it
    ///
    /// On error the scene is left untouched.
    pub fn generate<S: Scene + ?Sized>(&mut self, scene: &mut S) -> Result<LayerLayout, GenerationError> {
        let mut rng = self.config.make_rng();
        let layout = generate_layer(&self.config, &self.theme, &self.fixed, 0, &mut rng)?;
        self.clear(scene);
        self.spawned = layout.spawn_into(scene, self.config.unit_size, 0.0);
        Ok(layout)
    }

    /// Destroy everything spawned by the previous run
    pub fn clear<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for handle in self.spawned.drain(..) {
            scene.destroy(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::grid::{Direction, GridPos};
    use crate::room::{RoomSource, RoomTemplate, Rotation};
    use crate::scene::RecordingScene;

    fn hall() -> RoomTemplate {
        RoomTemplate::new("hall", "Rooms/Hall", 3, 2)
            .with_door(1, 0, Direction::South)
            .with_door(2, 1, Direction::East)
            .with_door(0, 1, Direction::West)
    }

    fn theme() -> Theme {
        Theme::new("test")
            .with_room(hall(), 1)
            .with_tile(crate::autotile::TileKind::Straight, "Corr/Straight", 1)
            .with_tile(crate::autotile::TileKind::Corner, "Corr/Corner", 1)
            .with_blocked_door("Props/Rubble")
    }

    #[test]
    fn test_room_pivot_offsets() {
        let room = |k| RoomInstance {
            id: crate::room::RoomId(0),
            template: Arc::new(hall()),
            origin: GridPos::new(2, 3),
            rotation: Rotation::new(k),
            ghost: false,
            base_layer: 0,
            source: RoomSource::Pool,
        };
        let p = |k| room_transform(&room(k), 2.0, 1.0);
        assert_eq!(p(0).position, Vec3::new(4.0, 1.0, 6.0));
        assert_eq!(p(1).position, Vec3::new(4.0, 1.0, 12.0));
        assert_eq!(p(2).position, Vec3::new(10.0, 1.0, 10.0));
        assert_eq!(p(3).position, Vec3::new(8.0, 1.0, 6.0));
        assert_eq!(p(3).yaw_degrees, 270.0);
    }

    #[test]
    fn test_unsupported_layer() {
        let mut rng = GameRng::new(1);
        let result = generate_layer(&GeneratorConfig::default(), &theme(), &[], 2, &mut rng);
        assert_eq!(result.err(), Some(GenerationError::UnsupportedLayer(2)));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = GeneratorConfig { seed: 99, ..Default::default() };
        let a = generate_layer(&config, &theme(), &[], 0, &mut config.make_rng()).unwrap();
        let b = generate_layer(&config, &theme(), &[], 0, &mut config.make_rng()).unwrap();
        assert_eq!(a.report, b.report);
        assert_eq!(a.tiles, b.tiles);
        assert_eq!(a.seals, b.seals);
    }

    #[test]
    fn test_every_door_is_used_or_sealed() {
        let config = GeneratorConfig { seed: 4, cap_room_chance: 0.0, ..Default::default() };
        let layout = generate_layer(&config, &theme(), &[], 0, &mut config.make_rng()).unwrap();
        let sealed: BTreeSet<DoorId> = layout.seals.iter().map(|s| s.door).collect();
        for door in &layout.doors {
            assert!(
                layout.used_doors.contains(&door.id) != sealed.contains(&door.id),
                "door {:?} must be either used or sealed",
                door.id
            );
        }
        assert_eq!(layout.report.corridor_cells, layout.tiles.len());
    }

    #[test]
    fn test_extreme_costs_still_generate() {
        let config = GeneratorConfig {
            grid_width: 20,
            grid_height: 20,
            target_room_count: 4,
            digging_cost: u32::MAX,
            existing_path_cost: u32::MAX - 1,
            turn_cost: u32::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        let layout = generate_layer(&config, &theme(), &[], 0, &mut config.make_rng()).unwrap();
        assert_eq!(layout.report.corridor_cells, layout.tiles.len());
    }

    #[test]
    fn test_invalid_config_leaves_scene_alone() {
        let mut scene = RecordingScene::new();
        let mut generator = DungeonGenerator::new(GeneratorConfig::default(), theme());
        generator.generate(&mut scene).unwrap();
        let before = scene.len();
        assert!(before > 0);

        let mut broken = DungeonGenerator::new(
            GeneratorConfig { loop_chance: 2.0, ..Default::default() },
            theme(),
        );
        broken.spawned = generator.spawned.clone();
        assert!(broken.generate(&mut scene).is_err());
        assert_eq!(scene.len(), before);
    }

    #[test]
    fn test_regenerate_replaces_previous_run() {
        let mut scene = RecordingScene::new();
        let mut generator = DungeonGenerator::new(GeneratorConfig::default(), theme());
        let a = generator.generate(&mut scene).unwrap();
        let first = scene.len();
        let b = generator.generate(&mut scene).unwrap();
        assert_eq!(scene.len(), first);
        assert_eq!(scene.destroyed(), first);
        // Each run starts from an empty grid, so nothing leaks from the first.
        assert_eq!(a.tiles, b.tiles);
        assert_eq!(a.occupancy.corridor_count(), b.occupancy.corridor_count());
        assert_eq!(a.occupancy.room_cells().count(), b.occupancy.room_cells().count());

        generator.clear(&mut scene);
        assert!(scene.is_empty());
        assert!(generator.spawned().is_empty());
    }
}
