//! dg-core: grid dungeon layout generator
//!
//! Places room modules on a grid, links their doors through a Delaunay
//! candidate graph reduced to a spanning forest with loops, carves corridors
//! with a weighted A* and picks a tile for every corridor cell. Unused doors
//! are capped or sealed. Several vertical layers can be stacked, with rooms
//! that cross layers reserved as ghosts on their neighbours.
//!
//! The crate has no engine dependency: finished layouts are handed to a
//! [`Scene`] that spawns prefabs at transforms.

pub mod autotile;
pub mod config;
pub mod error;
pub mod generator;
pub mod graph;
pub mod grid;
pub mod layers;
pub mod placement;
pub mod report;
pub mod room;
pub mod router;
pub mod scene;
pub mod seal;
pub mod theme;

mod rng;

pub use autotile::{Connections, CorridorTile, TileKind};
pub use config::GeneratorConfig;
pub use error::{ConfigError, GenerationError};
pub use generator::{DungeonGenerator, LayerLayout, generate_layer};
pub use grid::{Direction, DungeonNode, GridBounds, GridPos, GridRect, Occupancy};
pub use layers::{DungeonStack, MultiLayerDungeon, StackThemes, generate_stack};
pub use placement::FixedRoom;
pub use report::{GenerationReport, GenerationWarning};
pub use rng::GameRng;
pub use room::{DoorDef, DoorEdge, DoorId, DoorNode, RoomId, RoomInstance, RoomSource, RoomTemplate, Rotation};
pub use scene::{RecordingScene, Scene, SpawnHandle, SpawnKind, SpawnRequest, Transform, Vec3};
pub use theme::{Theme, TilePools, WeightedPrefab, WeightedTemplate};
